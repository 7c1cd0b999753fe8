// SPDX-License-Identifier: MPL-2.0

//! Still capture from the camera provider
//!
//! A still is the next preview frame after the request. The provider owns the
//! one-shot sender; dropping it (preview stopped) cancels the capture.

use crate::backends::camera::CaptureProvider;
use crate::backends::camera::types::{StillCapture, StillReceiver};
use crate::errors::{AppResult, CaptureError};
use tracing::{debug, info, warn};

/// Still capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Arm a still capture on the provider
    pub fn request(provider: &dyn CaptureProvider) -> AppResult<StillReceiver> {
        info!(device = %provider.device().name, "Requesting still capture");
        let receiver = provider.capture()?;
        Ok(receiver)
    }

    /// Wait for the armed capture to deliver a frame
    pub async fn receive(receiver: StillReceiver) -> Result<StillCapture, CaptureError> {
        match receiver.await {
            Ok(still) => {
                debug!(
                    width = still.frame.width,
                    height = still.frame.height,
                    rotation = %still.rotation,
                    "Still frame received"
                );
                Ok(still)
            }
            Err(_) => {
                warn!("Still capture cancelled before a frame arrived");
                Err(CaptureError::Cancelled)
            }
        }
    }
}
