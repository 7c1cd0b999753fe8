// SPDX-License-Identifier: GPL-3.0-only

//! Capture handlers
//!
//! Handles the capture button, the finished still and the reveal animation.

use crate::app::state::{AppModel, Message};
use crate::errors::AppError;
use crate::pipelines::photo::CapturedImage;
use cosmic::Task;
use std::time::Instant;
use tracing::info;

impl AppModel {
    pub(crate) fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        if !self.flow.begin_capture() {
            return Task::none();
        }

        info!("Capturing photo");
        Task::perform(self.photo.capture(), |result| {
            cosmic::Action::App(Message::ImageCaptured(result))
        })
    }

    pub(crate) fn handle_image_captured(
        &mut self,
        result: Result<CapturedImage, AppError>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(image) => {
                let now = Instant::now();
                if self.flow.on_image_captured(image, now) {
                    self.last_tick = now;
                }
            }
            Err(e) => self.flow.on_capture_failed(&e),
        }
        Task::none()
    }

    pub(crate) fn handle_reveal_tick(&mut self, now: Instant) -> Task<cosmic::Action<Message>> {
        self.last_tick = now;
        Task::none()
    }
}
