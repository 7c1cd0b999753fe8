// SPDX-License-Identifier: GPL-3.0-only

//! Permission handlers
//!
//! Handles the "Enable Camera" request and the gate's answer.

use crate::app::state::{AppModel, Message};
use crate::backends::permission::PermissionStatus;
use cosmic::Task;
use tracing::info;

impl AppModel {
    pub(crate) fn handle_request_permission(&mut self) -> Task<cosmic::Action<Message>> {
        if !self.flow.begin_permission_request() {
            return Task::none();
        }

        info!("Requesting camera permission");

        Task::perform(self.permission.request(), |status| {
            cosmic::Action::App(Message::PermissionResolved(status))
        })
    }

    pub(crate) fn handle_permission_resolved(
        &mut self,
        status: PermissionStatus,
    ) -> Task<cosmic::Action<Message>> {
        self.flow.on_permission_resolved(status);
        Task::none()
    }
}
