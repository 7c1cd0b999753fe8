// SPDX-License-Identifier: GPL-3.0-only

//! Capture-and-reveal flow
//!
//! The whole app is a one-way trip through three states:
//!
//! ```text
//! AwaitingPermission ──granted──▶ Live ──photo──▶ Revealed
//! ```
//!
//! There is no way back. Failures along the way (denied permission, preview
//! binding, capture, sound) are logged and leave the flow where it was.

use crate::backends::camera::BackendError;
use crate::backends::permission::PermissionStatus;
use crate::backends::sound::SoundCue;
use crate::constants::reveal;
use crate::errors::AppError;
use crate::pipelines::photo::CapturedImage;
use cosmic::widget::image::Handle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Which screen the app is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Camera access not granted yet
    AwaitingPermission,
    /// Preview running, waiting for the user to take a picture
    Live,
    /// Photo frozen with the meme fading in
    Revealed,
}

/// Fade-in of the meme overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealAnimation {
    started: Instant,
    duration: Duration,
}

impl RevealAnimation {
    pub fn start(now: Instant) -> Self {
        Self {
            started: now,
            duration: reveal::FADE_DURATION,
        }
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Overlay opacity in `[0, 1]`
    pub fn opacity(&self, now: Instant) -> f32 {
        ease_in(self.progress(now))
    }

    pub fn is_running(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.duration
    }
}

/// Ease-in timing curve
pub fn ease_in(t: f32) -> f32 {
    let (x1, y1, x2, y2) = reveal::EASE_IN;
    cubic_bezier(t, x1, y1, x2, y2)
}

const BEZIER_EPSILON: f32 = 1e-6;

/// Evaluate a CSS-style cubic Bézier timing function at `t`
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = solve_curve_x(t, x1, x2);
    bezier_component(s, y1, y2)
}

/// One coordinate of the curve through (0,0), p1, p2, (1,1)
fn bezier_component(s: f32, p1: f32, p2: f32) -> f32 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let u = 1.0 - s;
    3.0 * u * u * p1 + 6.0 * u * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`
fn solve_curve_x(x: f32, x1: f32, x2: f32) -> f32 {
    // Newton first, bisection when the slope flattens out
    let mut s = x;
    for _ in 0..8 {
        let err = bezier_component(s, x1, x2) - x;
        if err.abs() < BEZIER_EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < BEZIER_EPSILON {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = x;
    for _ in 0..32 {
        let value = bezier_component(s, x1, x2);
        if (value - x).abs() < BEZIER_EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

/// Capture flow controller
///
/// Owns the flow state, the latest preview frame, the captured photo and the
/// reveal animation. The sound cue is injected so it can be replaced in tests.
pub struct CaptureFlow {
    state: FlowState,
    permission_request_pending: bool,
    preview: Option<Handle>,
    image: Option<CapturedImage>,
    capture_in_flight: bool,
    preview_failed: bool,
    reveal: Option<RevealAnimation>,
    sound: Arc<dyn SoundCue>,
}

impl CaptureFlow {
    /// Start in `Live` if access is already granted
    pub fn new(permission_granted: bool, sound: Arc<dyn SoundCue>) -> Self {
        let state = if permission_granted {
            FlowState::Live
        } else {
            FlowState::AwaitingPermission
        };
        info!(?state, "Capture flow created");

        Self {
            state,
            permission_request_pending: false,
            preview: None,
            image: None,
            capture_in_flight: false,
            preview_failed: false,
            reveal: None,
            sound,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Latest preview frame, only while live
    pub fn preview(&self) -> Option<&Handle> {
        self.preview.as_ref()
    }

    /// Whether a permission request is waiting for the user
    pub fn is_permission_request_pending(&self) -> bool {
        self.permission_request_pending
    }

    /// The captured photo, once revealed
    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    pub fn is_capture_in_flight(&self) -> bool {
        self.capture_in_flight
    }

    /// Whether the capture button should accept a press
    pub fn can_capture(&self) -> bool {
        self.state == FlowState::Live && !self.capture_in_flight
    }

    /// Whether the preview failed to bind
    pub fn preview_failed(&self) -> bool {
        self.preview_failed
    }

    /// Mark a permission request as sent. Returns `false` if one is already
    /// pending or access is no longer needed.
    pub fn begin_permission_request(&mut self) -> bool {
        if self.permission_request_pending || self.state != FlowState::AwaitingPermission {
            debug!(
                state = ?self.state,
                pending = self.permission_request_pending,
                "Permission request already pending or not needed"
            );
            return false;
        }
        self.permission_request_pending = true;
        true
    }

    /// Apply the gate's answer. Returns whether the flow went live.
    pub fn on_permission_resolved(&mut self, status: PermissionStatus) -> bool {
        self.permission_request_pending = false;
        match status {
            PermissionStatus::Granted => self.on_permission_granted(),
            PermissionStatus::Denied => {
                info!("Camera permission denied, staying on request screen");
                false
            }
        }
    }

    /// `AwaitingPermission → Live`. Returns whether the state changed.
    pub fn on_permission_granted(&mut self) -> bool {
        if self.state != FlowState::AwaitingPermission {
            return false;
        }
        info!("Camera permission granted, going live");
        self.state = FlowState::Live;
        true
    }

    /// Mark a capture as in flight. Returns `false` if the press must be ignored.
    pub fn begin_capture(&mut self) -> bool {
        if !self.can_capture() {
            info!(
                state = ?self.state,
                in_flight = self.capture_in_flight,
                "Ignoring capture request"
            );
            return false;
        }
        self.capture_in_flight = true;
        true
    }

    /// Whether preview frames are wanted at all
    pub fn accepts_preview(&self) -> bool {
        self.state == FlowState::Live
    }

    /// Show `frame` as the live preview. Late frames outside `Live` are dropped.
    pub fn on_preview_frame(&mut self, frame: Handle) -> bool {
        if !self.accepts_preview() {
            return false;
        }
        self.preview = Some(frame);
        true
    }

    /// `Live → Revealed` with `image`. Outside `Live` the image is dropped.
    pub fn on_image_captured(&mut self, image: CapturedImage, now: Instant) -> bool {
        if self.state != FlowState::Live {
            warn!(state = ?self.state, "Dropping captured image outside live preview");
            return false;
        }

        info!(
            width = image.width(),
            height = image.height(),
            "Photo captured, revealing meme"
        );
        self.image = Some(image);
        self.preview = None;
        self.capture_in_flight = false;
        self.state = FlowState::Revealed;
        self.reveal = Some(RevealAnimation::start(now));

        if let Err(e) = self.sound.play() {
            error!(error = %e, "Failed to play whistle");
        }
        true
    }

    /// Log a failed capture and allow another attempt
    pub fn on_capture_failed(&mut self, error: &AppError) {
        error!(%error, "Capture failed");
        self.capture_in_flight = false;
    }

    /// Log a preview binding failure; the flow stays put with no preview
    pub fn on_preview_failed(&mut self, error: &BackendError) {
        error!(%error, "Camera preview unavailable");
        self.preview_failed = true;
        self.preview = None;
    }

    /// Overlay opacity at `now` (0 before the reveal)
    pub fn reveal_opacity(&self, now: Instant) -> f32 {
        self.reveal.map(|r| r.opacity(now)).unwrap_or(0.0)
    }

    /// Whether the overlay is still fading in
    pub fn is_revealing(&self, now: Instant) -> bool {
        self.reveal.is_some_and(|r| r.is_running(now))
    }
}

impl std::fmt::Debug for CaptureFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureFlow")
            .field("state", &self.state)
            .field("permission_request_pending", &self.permission_request_pending)
            .field("has_preview", &self.preview.is_some())
            .field("has_image", &self.image.is_some())
            .field("capture_in_flight", &self.capture_in_flight)
            .field("preview_failed", &self.preview_failed)
            .field("reveal", &self.reveal)
            .finish()
    }
}
