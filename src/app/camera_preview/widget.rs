// SPDX-License-Identifier: GPL-3.0-only

//! Camera preview widget implementation

use crate::app::state::{AppModel, Message};
use cosmic::Element;
use cosmic::iced::{Background, ContentFit, Length};
use cosmic::widget;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

impl AppModel {
    /// Build the camera preview widget
    ///
    /// The latest frame covers the whole window. Until the first frame
    /// arrives, or when the preview could not be bound at all, a themed
    /// placeholder is shown instead.
    pub fn build_camera_preview(&self) -> Element<'_, Message> {
        if let Some(handle) = self.flow.preview() {
            return widget::image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        static NO_FRAME_COUNT: AtomicU64 = AtomicU64::new(0);
        let count = NO_FRAME_COUNT.fetch_add(1, Ordering::Relaxed);
        if count.is_multiple_of(30) {
            info!(
                render_count = count,
                preview_failed = self.flow.preview_failed(),
                "No frame available in view"
            );
        }

        // Themed canvas placeholder when no camera frame
        widget::container(widget::Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|theme: &cosmic::Theme| widget::container::Style {
                background: Some(Background::Color(theme.cosmic().bg_color().into())),
                ..Default::default()
            })
            .into()
    }
}
