// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Handles configuration changes.

use crate::app::state::{AppModel, Message};
use crate::config::Config;
use cosmic::Task;
use tracing::info;

impl AppModel {
    pub(crate) fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");

        let theme_changed = config.app_theme != self.config.app_theme;
        if config.camera_path != self.config.camera_path {
            info!(
                camera_path = ?config.camera_path,
                "Camera preference changed, takes effect on next launch"
            );
        }
        self.config = config;

        if theme_changed {
            info!(app_theme = ?self.config.app_theme, "Applying application theme");
            return cosmic::command::set_theme(self.config.app_theme.theme());
        }
        Task::none()
    }
}
