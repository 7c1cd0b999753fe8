// SPDX-License-Identifier: MPL-2.0

//! Camera capture provider
//!
//! The capture flow only needs three things from a camera: a live preview, a
//! way to stop it, and a one-shot still capture that reports how the buffer
//! must be rotated. [`CaptureProvider`] is that contract.
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureProvider     │  ← preview + one-shot still
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← GStreamer pipewiresrc
//!       └────────┘
//! ```

pub mod enumeration;
pub mod pipewire;
pub mod types;

pub use pipewire::PipeWireCamera;
pub use types::*;

/// Camera collaborator used by the capture flow
pub trait CaptureProvider: Send + Sync {
    /// Bind the preview stream, pushing every decoded frame into `frames`.
    ///
    /// Replaces any preview that is already bound.
    fn start_preview(&self, frames: FrameSender) -> BackendResult<()>;

    /// Release the camera. Any pending still capture resolves as cancelled.
    fn stop_preview(&self);

    /// Request the next frame as a still.
    ///
    /// Fails with [`BackendError::NotBound`] when no preview is running and
    /// with [`BackendError::CaptureInProgress`] while an earlier request is
    /// still waiting for its frame.
    fn capture(&self) -> BackendResult<StillReceiver>;

    /// The device this provider opens
    fn device(&self) -> &CameraDevice;
}

/// Pick the camera to open
///
/// An explicit preference wins, then a back-facing sensor, then the first
/// device. With nothing enumerated PipeWire's default source is used.
pub fn select_device(cameras: &[CameraDevice], preferred: Option<&str>) -> CameraDevice {
    if let Some(path) = preferred.filter(|p| !p.is_empty()) {
        if let Some(camera) = cameras.iter().find(|c| c.path == path || c.name == path) {
            return camera.clone();
        }
        tracing::info!(path, "Preferred camera not found, falling back");
    }

    cameras
        .iter()
        .find(|c| c.is_back_facing())
        .or_else(|| cameras.first())
        .cloned()
        .unwrap_or_else(CameraDevice::default_source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(name: &str, path: &str, location: Option<&str>) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            path: path.to_string(),
            rotation: SensorRotation::None,
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn test_preferred_camera_wins() {
        let cameras = vec![
            camera("Front", "41", Some("front")),
            camera("Back", "42", Some("back")),
        ];
        assert_eq!(select_device(&cameras, Some("41")).name, "Front");
        assert_eq!(select_device(&cameras, Some("Front")).path, "41");
    }

    #[test]
    fn test_back_camera_preferred_over_first() {
        let cameras = vec![
            camera("Front", "41", Some("front")),
            camera("Back", "42", Some("back")),
        ];
        assert_eq!(select_device(&cameras, None).name, "Back");
        assert_eq!(select_device(&cameras, Some("99")).name, "Back");
    }

    #[test]
    fn test_first_camera_without_location() {
        let cameras = vec![camera("USB", "7", None), camera("Other", "8", None)];
        assert_eq!(select_device(&cameras, Some("")).name, "USB");
    }

    #[test]
    fn test_default_source_when_empty() {
        let device = select_device(&[], None);
        assert!(device.path.is_empty());
        assert_eq!(device, CameraDevice::default_source());
    }
}
