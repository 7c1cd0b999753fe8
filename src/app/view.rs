// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! One screen per flow state:
//! - Awaiting permission: "Enable Camera" button (controls module)
//! - Live: camera preview (camera_preview module) with the capture button
//! - Revealed: frozen photo with the meme overlay (reveal_overlay module)

use crate::app::flow::FlowState;
use crate::app::state::{AppModel, Message};
use cosmic::Element;
use cosmic::iced::{Background, Color, Length};
use cosmic::widget;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let content = match self.flow.state() {
            FlowState::AwaitingPermission => self.build_permission_button(),
            FlowState::Live => {
                let capture_button = widget::container(self.build_capture_button())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .align_y(cosmic::iced::alignment::Vertical::Bottom);

                cosmic::iced::widget::stack![self.build_camera_preview(), capture_button]
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
            FlowState::Revealed => self.build_reveal(),
        };

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into()
    }
}
