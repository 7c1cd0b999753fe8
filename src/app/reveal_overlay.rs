// SPDX-License-Identifier: GPL-3.0-only

//! Frozen photo with the meme fading in on top

use crate::app::state::{AppModel, Message};
use crate::constants::reveal;
use cosmic::Element;
use cosmic::iced::{Background, Color, ContentFit, Length};
use cosmic::widget;
use cosmic::widget::image::Handle;
use std::sync::LazyLock;

/// Embedded meme overlay (PNG)
static MEME_OVERLAY: &[u8] = include_bytes!("../../resources/meme/overlay.png");

static MEME_HANDLE: LazyLock<Handle> = LazyLock::new(|| Handle::from_bytes(MEME_OVERLAY));

impl AppModel {
    /// Build the revealed screen
    ///
    /// The captured photo covers the window; the 300×200 meme is stretched
    /// into its box, centered, at the current fade opacity.
    pub fn build_reveal(&self) -> Element<'_, Message> {
        let photo: Element<'_, Message> = match self.flow.image() {
            Some(image) => widget::image(image.handle().clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::BLACK)),
                    ..Default::default()
                })
                .into(),
        };

        let opacity = self.flow.reveal_opacity(self.last_tick);

        let meme = widget::image(MEME_HANDLE.clone())
            .content_fit(ContentFit::Fill)
            .width(Length::Fixed(reveal::OVERLAY_WIDTH))
            .height(Length::Fixed(reveal::OVERLAY_HEIGHT))
            .opacity(opacity);

        let centered_meme = widget::container(meme)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(cosmic::iced::alignment::Horizontal::Center)
            .align_y(cosmic::iced::alignment::Vertical::Center);

        cosmic::iced::widget::stack![photo, centered_meme]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_meme_matches_overlay_box() {
        let meme = image::load_from_memory(MEME_OVERLAY).unwrap();
        assert_eq!(
            (meme.width() as f32, meme.height() as f32),
            (reveal::OVERLAY_WIDTH, reveal::OVERLAY_HEIGHT)
        );
    }
}
