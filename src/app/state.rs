// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::flow::CaptureFlow;
use crate::backends::camera::CaptureProvider;
use crate::backends::camera::types::{BackendError, CameraFrame};
use crate::backends::permission::{PermissionGate, PermissionStatus};
use crate::backends::sound::SoundCue;
use crate::config::Config;
use crate::errors::AppError;
use crate::pipelines::photo::{CapturedImage, PhotoPipeline};
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::sync::Arc;
use std::time::Instant;

/// Platform collaborators handed to the application at startup
///
/// `main` builds the real ones; tests pass fakes.
#[derive(Clone)]
pub struct Flags {
    pub permission: Arc<dyn PermissionGate>,
    pub camera: Arc<dyn CaptureProvider>,
    pub sound: Arc<dyn SoundCue>,
    /// Configuration loaded before the window opens
    pub config: Config,
    pub config_handler: Option<cosmic_config::Config>,
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flags")
            .field("camera", self.camera.device())
            .field("permission_granted", &self.permission.is_granted())
            .field("config", &self.config)
            .finish()
    }
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler, if the config store could be opened
    pub config_handler: Option<cosmic_config::Config>,
    /// Capture-and-reveal state machine
    pub flow: CaptureFlow,
    /// Camera permission gate
    pub permission: Arc<dyn PermissionGate>,
    /// Camera providing the preview and the still
    pub camera: Arc<dyn CaptureProvider>,
    /// Still capture pipeline on top of `camera`
    pub photo: PhotoPipeline,
    /// Time of the last animation frame, drives the overlay opacity
    pub last_tick: Instant,
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page
    ToggleContextPage(ContextPage),

    // ===== Permission =====
    /// "Enable Camera" pressed
    RequestPermission,
    /// The permission gate answered
    PermissionResolved(PermissionStatus),

    // ===== Camera =====
    /// New preview frame from the camera subscription
    CameraFrame(Arc<CameraFrame>),
    /// The preview could not be bound
    PreviewFailed(BackendError),

    // ===== Capture =====
    /// "Take Cool Picture" pressed
    Capture,
    /// Still capture finished (upright image or error)
    ImageCaptured(Result<CapturedImage, AppError>),
    /// Animation frame while the meme fades in
    RevealTick(Instant),

    // ===== System =====
    /// Configuration changed on disk
    UpdateConfig(Config),
}
