// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Sensor rotation in degrees (clockwise)
///
/// Describes how a raw buffer must be rotated to appear upright. Sensors on
/// phones and tablets are commonly mounted at 90° or 270° relative to the
/// display.
///
/// The rotation value comes from libcamera's `api.libcamera.rotation`
/// property on the PipeWire node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Parse rotation from a string value (degrees)
    pub fn from_degrees(degrees: &str) -> Self {
        degrees
            .trim()
            .parse::<i32>()
            .map(Self::from_degrees_int)
            .unwrap_or_default()
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// The rotation that undoes this one (`360 - degrees`)
    pub fn inverse(&self) -> Self {
        Self::from_degrees_int(360 - self.degrees() as i32)
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Represents a camera device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String, // PipeWire target object (serial); empty = auto-select
    pub rotation: SensorRotation, // Sensor rotation from libcamera/device tree
    pub location: Option<String>, // "front", "back" or "external"
}

impl CameraDevice {
    /// PipeWire's default video source
    pub fn default_source() -> Self {
        Self {
            name: "Default Camera".to_string(),
            ..Default::default()
        }
    }

    /// Check if the sensor faces away from the user
    pub fn is_back_facing(&self) -> bool {
        self.location.as_deref() == Some("back")
    }
}

/// A single RGBA preview frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Check whether rows carry padding past `width * 4`
    pub fn is_padded(&self) -> bool {
        self.stride != self.width * 4
    }
}

/// A still frame together with the rotation needed to show it upright
#[derive(Debug, Clone)]
pub struct StillCapture {
    pub frame: CameraFrame,
    pub rotation: SensorRotation,
}

/// PipeWire connection handed out by the camera portal
///
/// Empty outside a sandbox, where `pipewiresrc` talks to the session daemon
/// directly. Inside Flatpak only this remote exposes camera nodes. Clones share
/// the same slot so the permission gate can fill it for the camera backend.
#[derive(Debug, Clone, Default)]
pub struct PipeWireRemote(Arc<Mutex<Option<OwnedFd>>>);

impl PipeWireRemote {
    /// Keep `fd` as the remote for every later pipeline
    pub fn set(&self, fd: OwnedFd) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(fd);
        }
    }

    /// Descriptor to hand to `pipewiresrc fd=`. The element duplicates it.
    pub fn raw_fd(&self) -> Option<RawFd> {
        self.0
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|fd| fd.as_raw_fd()))
    }
}

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// One-shot receiver for a pending still capture
///
/// Resolves with `Canceled` if the preview stops before a frame arrives.
pub type StillReceiver = futures::channel::oneshot::Receiver<StillCapture>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to bind the preview pipeline
    InitializationFailed(String),
    /// No preview is bound, so nothing can be captured
    NotBound,
    /// A still capture is already waiting for a frame
    CaptureInProgress,
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::NotBound => write!(f, "Camera preview is not bound"),
            BackendError::CaptureInProgress => write!(f, "Capture already in progress"),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_parsing() {
        assert_eq!(SensorRotation::from_degrees("90"), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees(" 270 "), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees("-90"), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees("450"), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees("45"), SensorRotation::None);
        assert_eq!(SensorRotation::from_degrees(""), SensorRotation::None);
        assert_eq!(SensorRotation::from_degrees("upright"), SensorRotation::None);
    }

    #[test]
    fn test_rotation_inverse() {
        assert_eq!(SensorRotation::None.inverse(), SensorRotation::None);
        assert_eq!(SensorRotation::Rotate90.inverse(), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::Rotate180.inverse(), SensorRotation::Rotate180);
        assert_eq!(SensorRotation::Rotate270.inverse(), SensorRotation::Rotate90);
    }

    #[test]
    fn test_swaps_dimensions() {
        assert!(!SensorRotation::None.swaps_dimensions());
        assert!(SensorRotation::Rotate90.swaps_dimensions());
        assert!(!SensorRotation::Rotate180.swaps_dimensions());
        assert!(SensorRotation::Rotate270.swaps_dimensions());
    }

    #[test]
    fn test_back_facing() {
        let device = CameraDevice {
            location: Some("back".to_string()),
            ..CameraDevice::default_source()
        };
        assert!(device.is_back_facing());
        assert!(!CameraDevice::default_source().is_back_facing());
    }

    #[test]
    fn test_remote_is_shared_between_clones() {
        let remote = PipeWireRemote::default();
        let camera_side = remote.clone();
        assert_eq!(camera_side.raw_fd(), None);

        let fd = OwnedFd::from(std::fs::File::open("/dev/null").unwrap());
        let raw = fd.as_raw_fd();
        remote.set(fd);
        assert_eq!(camera_side.raw_fd(), Some(raw));
    }
}
