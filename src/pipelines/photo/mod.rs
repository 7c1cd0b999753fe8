// SPDX-License-Identifier: MPL-2.0

//! Async still capture pipeline
//!
//! ```text
//! Capture provider → one-shot still → stride repack → rotation → CapturedImage
//!       ↓
//! Preview continues uninterrupted
//! ```
//!
//! The still request is armed synchronously so a provider refusal (no bound
//! preview, capture already pending) is reported right away. Everything after
//! that runs in the returned future.

pub mod capture;
pub mod processing;

pub use capture::PhotoCapture;
pub use processing::{frame_to_rgba, normalize_capture, rotate_upright, upright_rgba};

use crate::backends::camera::CaptureProvider;
use crate::errors::AppResult;
use cosmic::widget::image::Handle;
use image::RgbaImage;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// An upright, immutable RGBA photo ready for display
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pixels: Arc<RgbaImage>,
    handle: Handle,
}

impl CapturedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        let handle = Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone());
        Self {
            pixels: Arc::new(pixels),
            handle,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Image handle for the renderer
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Still capture pipeline bound to one capture provider
#[derive(Clone)]
pub struct PhotoPipeline {
    provider: Arc<dyn CaptureProvider>,
}

impl PhotoPipeline {
    pub fn new(provider: Arc<dyn CaptureProvider>) -> Self {
        Self { provider }
    }

    /// Take one photo and turn it upright
    ///
    /// Resolves once the next preview frame has arrived and been rotated.
    pub fn capture(&self) -> impl Future<Output = AppResult<CapturedImage>> + Send + 'static {
        let pending = PhotoCapture::request(self.provider.as_ref());

        async move {
            let still = PhotoCapture::receive(pending?).await?;
            let image = normalize_capture(still).await?;
            info!(
                width = image.width(),
                height = image.height(),
                "Photo ready"
            );
            Ok(image)
        }
    }
}

impl std::fmt::Debug for PhotoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoPipeline")
            .field("device", self.provider.device())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::*;
    use crate::errors::{AppError, CaptureError};
    use futures::channel::oneshot;
    use std::time::Instant;

    /// Provider that answers every still request with a fixed 2x1 frame
    struct FixedCamera {
        device: CameraDevice,
        deliver: bool,
    }

    impl FixedCamera {
        fn new(rotation: SensorRotation, deliver: bool) -> Self {
            Self {
                device: CameraDevice {
                    rotation,
                    ..CameraDevice::default_source()
                },
                deliver,
            }
        }
    }

    impl CaptureProvider for FixedCamera {
        fn start_preview(&self, _frames: FrameSender) -> BackendResult<()> {
            Ok(())
        }

        fn stop_preview(&self) {}

        fn capture(&self) -> BackendResult<StillReceiver> {
            let (sender, receiver) = oneshot::channel();
            if self.deliver {
                let frame = CameraFrame {
                    width: 2,
                    height: 1,
                    data: Arc::from(vec![1u8, 1, 1, 255, 2, 2, 2, 255]),
                    stride: 8,
                    captured_at: Instant::now(),
                };
                let _ = sender.send(StillCapture {
                    frame,
                    rotation: self.device.rotation,
                });
            } else {
                // Preview stopped before a frame arrived
                drop(sender);
            }
            Ok(receiver)
        }

        fn device(&self) -> &CameraDevice {
            &self.device
        }
    }

    #[tokio::test]
    async fn test_capture_rotates_upright() {
        let pipeline = PhotoPipeline::new(Arc::new(FixedCamera::new(
            SensorRotation::Rotate90,
            true,
        )));

        let image = pipeline.capture().await.unwrap();
        assert_eq!((image.width(), image.height()), (1, 2));
        assert_eq!(image.pixels().get_pixel(0, 0).0, [1, 1, 1, 255]);
        assert_eq!(image.pixels().get_pixel(0, 1).0, [2, 2, 2, 255]);
    }

    #[tokio::test]
    async fn test_dropped_request_is_cancelled() {
        let pipeline = PhotoPipeline::new(Arc::new(FixedCamera::new(SensorRotation::None, false)));

        match pipeline.capture().await {
            Err(AppError::Capture(CaptureError::Cancelled)) => {}
            other => panic!("expected cancelled capture, got {:?}", other.map(|_| ())),
        }
    }
}
