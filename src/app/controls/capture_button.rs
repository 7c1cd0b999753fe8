// SPDX-License-Identifier: MPL-2.0

//! Capture button widget implementation

use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Alignment, Background, Color, Length, Padding};
use cosmic::widget;

impl AppModel {
    /// Build the capture button widget
    ///
    /// A white circle labelled "Take Cool Picture". While a capture is in
    /// flight it turns gray, shrinks slightly and ignores presses.
    pub fn build_capture_button(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();
        let enabled = self.flow.can_capture();

        let (color, inner_size) = if enabled {
            (Color::WHITE, ui::CAPTURE_BUTTON_INNER)
        } else {
            // Press down effect while the still is on its way
            (
                Color::from_rgb(0.7, 0.7, 0.7),
                ui::CAPTURE_BUTTON_INNER * 0.85,
            )
        };

        let circle = widget::container(widget::Space::new(
            Length::Fixed(inner_size),
            Length::Fixed(inner_size),
        ))
        .style(move |_theme| widget::container::Style {
            background: Some(Background::Color(color)),
            border: cosmic::iced::Border {
                radius: [ui::CAPTURE_BUTTON_RADIUS * (inner_size / ui::CAPTURE_BUTTON_INNER); 4]
                    .into(),
                ..Default::default()
            },
            ..Default::default()
        });

        // Fixed-size slot so the circle shrinking does not shift the label
        let circle_slot = widget::container(circle)
            .width(Length::Fixed(ui::CAPTURE_BUTTON_OUTER))
            .height(Length::Fixed(ui::CAPTURE_BUTTON_OUTER))
            .center_x(ui::CAPTURE_BUTTON_OUTER)
            .center_y(ui::CAPTURE_BUTTON_OUTER);

        let label = widget::text(fl!("take-picture")).size(ui::CAPTURE_LABEL_TEXT_SIZE);

        let content = widget::column()
            .push(circle_slot)
            .push(label)
            .spacing(spacing.space_xxs)
            .align_x(Alignment::Center);

        let button = widget::button::custom(content)
            .padding(spacing.space_xxs)
            .on_press_maybe(enabled.then_some(Message::Capture));

        widget::container(button)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(Padding {
                bottom: f32::from(ui::CAPTURE_BUTTON_BOTTOM_PADDING),
                ..Padding::ZERO
            })
            .into()
    }
}
