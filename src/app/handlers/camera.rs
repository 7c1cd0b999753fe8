// SPDX-License-Identifier: GPL-3.0-only

//! Camera handlers
//!
//! Handles preview frames and preview binding failures.

use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::{BackendError, CameraFrame};
use crate::constants::timing;
use crate::pipelines::photo::upright_rgba;
use cosmic::Task;
use cosmic::widget::image::Handle;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

impl AppModel {
    pub(crate) fn handle_camera_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        // Late frames after the photo froze are dropped
        if !self.flow.accepts_preview() {
            return Task::none();
        }

        static FRAME_COUNT: AtomicU64 = AtomicU64::new(0);
        let count = FRAME_COUNT.fetch_add(1, Ordering::Relaxed);
        if count.is_multiple_of(timing::FRAME_LOG_INTERVAL) {
            debug!(
                frame = count,
                width = frame.width,
                height = frame.height,
                latency_ms = frame.captured_at.elapsed().as_secs_f64() * 1000.0,
                "Preview frame"
            );
        }

        // Same orientation as the still the user is about to take
        let upright = match upright_rgba(&frame, self.camera.device().rotation) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Dropping malformed preview frame");
                return Task::none();
            }
        };

        let (width, height) = upright.dimensions();
        self.flow
            .on_preview_frame(Handle::from_rgba(width, height, upright.into_raw()));
        Task::none()
    }

    pub(crate) fn handle_preview_failed(
        &mut self,
        error: BackendError,
    ) -> Task<cosmic::Action<Message>> {
        self.flow.on_preview_failed(&error);
        Task::none()
    }
}
