// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher; the handling itself lives
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::ui`: About drawer and external links
//! - `handlers::permission`: Camera permission request
//! - `handlers::camera`: Preview frames and binding failures
//! - `handlers::capture`: Still capture and the reveal animation
//! - `handlers::system`: Configuration updates

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Permission =====
            Message::RequestPermission => self.handle_request_permission(),
            Message::PermissionResolved(status) => self.handle_permission_resolved(status),

            // ===== Camera =====
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::PreviewFailed(error) => self.handle_preview_failed(error),

            // ===== Capture =====
            Message::Capture => self.handle_capture(),
            Message::ImageCaptured(result) => self.handle_image_captured(result),
            Message::RevealTick(now) => self.handle_reveal_tick(now),

            // ===== System =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
        }
    }
}
