// SPDX-License-Identifier: MPL-2.0

//! "Enable Camera" screen

use crate::app::state::{AppModel, Message};
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Background, Length};
use cosmic::widget;

impl AppModel {
    /// Centered button asking for camera access
    ///
    /// Inactive while the portal dialog is open.
    pub fn build_permission_button(&self) -> Element<'_, Message> {
        let button = widget::button::suggested(fl!("enable-camera")).on_press_maybe(
            (!self.flow.is_permission_request_pending()).then_some(Message::RequestPermission),
        );

        widget::container(button)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(cosmic::iced::alignment::Horizontal::Center)
            .align_y(cosmic::iced::alignment::Vertical::Center)
            .style(|theme: &cosmic::Theme| widget::container::Style {
                background: Some(Background::Color(theme.cosmic().bg_color().into())),
                text_color: Some(theme.cosmic().on_bg_color().into()),
                ..Default::default()
            })
            .into()
    }
}
