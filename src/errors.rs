// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture-and-reveal flow
//!
//! Nothing in the flow surfaces these to the user. They exist so collaborators
//! can report what went wrong and the controller can log it before failing open.

use crate::backends::camera::types::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera binding or streaming errors
    Camera(BackendError),
    /// Still capture errors
    Capture(CaptureError),
    /// Camera permission errors
    Permission(PermissionError),
    /// Sound cue playback errors
    Sound(String),
}

/// Still capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The provider dropped the request before a frame arrived
    Cancelled,
    /// Frame buffer does not match its declared geometry
    InvalidFrame(String),
    /// Rotation worker failed
    ProcessingFailed(String),
}

/// Camera permission errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Could not reach the session bus or the portal
    PortalUnavailable(String),
    /// The portal answered with a non-success response code
    Denied(u32),
    /// The portal reply could not be decoded
    MalformedResponse(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Sound(msg) => write!(f, "Sound error: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Cancelled => write!(f, "Capture cancelled before a frame arrived"),
            CaptureError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            CaptureError::ProcessingFailed(msg) => write!(f, "Processing failed: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::PortalUnavailable(msg) => {
                write!(f, "Camera portal unavailable: {}", msg)
            }
            PermissionError::Denied(code) => write!(f, "Camera access denied (response {})", code),
            PermissionError::MalformedResponse(msg) => {
                write!(f, "Malformed portal response: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for PermissionError {}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<zbus::Error> for PermissionError {
    fn from(err: zbus::Error) -> Self {
        PermissionError::PortalUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_category() {
        let err = AppError::from(CaptureError::Cancelled);
        assert_eq!(
            err.to_string(),
            "Capture error: Capture cancelled before a frame arrived"
        );

        let err = AppError::from(BackendError::NotBound);
        assert!(err.to_string().starts_with("Camera error:"));
    }

    #[test]
    fn test_denied_carries_response_code() {
        let err = PermissionError::Denied(1);
        assert_eq!(err.to_string(), "Camera access denied (response 1)");
    }
}
