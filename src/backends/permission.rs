// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission via the XDG desktop portal
//!
//! Sandboxed apps must ask `org.freedesktop.portal.Camera` before touching a
//! camera. The portal answers asynchronously on a `Request` object, so the
//! request handle is predicted from a token and the `Response` signal is
//! subscribed before `AccessCamera` is called.
//!
//! Once granted, `OpenPipeWireRemote` hands back the only PipeWire connection
//! that can see cameras from inside the sandbox. It is stored in the shared
//! [`PipeWireRemote`] for the camera backend.
//!
//! Outside a sandbox there is nobody to ask and access is always granted.

use crate::backends::camera::types::PipeWireRemote;
use crate::errors::PermissionError;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedFd, OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Camera permission collaborator used by the capture flow
pub trait PermissionGate: Send + Sync {
    /// Whether camera access is currently granted
    fn is_granted(&self) -> bool;

    /// Ask for camera access. The future resolves once the user answered.
    fn request(&self) -> BoxFuture<'static, PermissionStatus>;
}

/// Permission gate backed by the camera portal
#[derive(Debug, Clone)]
pub struct PortalPermissionGate {
    sandboxed: bool,
    granted: Arc<AtomicBool>,
    remote: PipeWireRemote,
}

impl PortalPermissionGate {
    /// Detect whether the app runs inside Flatpak
    pub fn new(remote: PipeWireRemote) -> Self {
        Self::with_sandbox(Path::new("/.flatpak-info").exists(), remote)
    }

    /// Create a gate with an explicit sandbox setting
    pub fn with_sandbox(sandboxed: bool, remote: PipeWireRemote) -> Self {
        info!(sandboxed, "Camera permission gate created");
        Self {
            sandboxed,
            granted: Arc::new(AtomicBool::new(!sandboxed)),
            remote,
        }
    }
}

impl PermissionGate for PortalPermissionGate {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }

    fn request(&self) -> BoxFuture<'static, PermissionStatus> {
        let sandboxed = self.sandboxed;
        let granted = Arc::clone(&self.granted);
        let remote = self.remote.clone();

        Box::pin(async move {
            if !sandboxed {
                granted.store(true, Ordering::Release);
                return PermissionStatus::Granted;
            }

            let status = match grant_camera(&remote).await {
                Ok(()) => PermissionStatus::Granted,
                Err(e) => {
                    warn!(error = %e, "Camera access not granted");
                    PermissionStatus::Denied
                }
            };
            granted.store(status.is_granted(), Ordering::Release);
            status
        })
    }
}

/// Ask the portal for access, then open the camera's PipeWire remote
async fn grant_camera(remote: &PipeWireRemote) -> Result<(), PermissionError> {
    let connection = zbus::Connection::session().await?;
    access_camera(&connection).await?;

    let fd = open_pipewire_remote(&connection).await?;
    remote.set(fd.into());
    info!("Camera portal PipeWire remote opened");
    Ok(())
}

/// Call `AccessCamera` and wait for the user's answer
async fn access_camera(connection: &zbus::Connection) -> Result<(), PermissionError> {
    let token = format!("whistle_meme_{}", uuid::Uuid::new_v4().simple());
    let sender = connection
        .unique_name()
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| PermissionError::PortalUnavailable("No unique bus name".to_string()))?;
    let handle = request_handle_path(&sender, &token);
    debug!(%handle, "Expecting portal request");

    let request_proxy = zbus::Proxy::new(
        connection,
        PORTAL_DESTINATION,
        handle.as_str(),
        REQUEST_INTERFACE,
    )
    .await?;
    let mut responses = request_proxy.receive_signal("Response").await?;

    let camera_proxy =
        zbus::Proxy::new(connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE).await?;

    let present: bool = camera_proxy
        .get_property("IsCameraPresent")
        .await
        .unwrap_or(true);
    if !present {
        info!("Portal reports no camera present");
    }

    let mut options: HashMap<&str, Value<'_>> = HashMap::new();
    options.insert("handle_token", Value::from(token.as_str()));

    let returned: OwnedObjectPath = camera_proxy.call("AccessCamera", &(options,)).await?;
    if returned.as_str() != handle {
        // Pre-0.9 portals ignore handle_token
        warn!(expected = %handle, returned = %returned.as_str(), "Unexpected request handle");
    }

    let message = responses.next().await.ok_or_else(|| {
        PermissionError::PortalUnavailable("Request closed without a response".to_string())
    })?;
    let (code, _results): (u32, HashMap<String, OwnedValue>) = message
        .body()
        .deserialize()
        .map_err(|e| PermissionError::MalformedResponse(e.to_string()))?;

    response_to_result(code)
}

/// Get a PipeWire connection restricted to the cameras this app may use
async fn open_pipewire_remote(connection: &zbus::Connection) -> Result<OwnedFd, PermissionError> {
    let camera_proxy =
        zbus::Proxy::new(connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE).await?;

    let options: HashMap<&str, Value<'_>> = HashMap::new();
    let fd: OwnedFd = camera_proxy.call("OpenPipeWireRemote", &(options,)).await?;
    Ok(fd)
}

/// Object path the portal uses for a request made with `token`
///
/// `:1.42` becomes `1_42`, per the portal's `Request` documentation.
fn request_handle_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("{}/request/{}/{}", PORTAL_PATH, sender, token)
}

/// Map a portal response code to a result (0 = success)
fn response_to_result(code: u32) -> Result<(), PermissionError> {
    match code {
        0 => Ok(()),
        other => Err(PermissionError::Denied(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_handle_path() {
        assert_eq!(
            request_handle_path(":1.42", "whistle_meme_abc"),
            "/org/freedesktop/portal/desktop/request/1_42/whistle_meme_abc"
        );
    }

    #[test]
    fn test_response_codes() {
        assert!(response_to_result(0).is_ok());
        assert_eq!(response_to_result(1), Err(PermissionError::Denied(1)));
        assert_eq!(response_to_result(2), Err(PermissionError::Denied(2)));
    }

    #[test]
    fn test_unsandboxed_gate_starts_granted() {
        let gate = PortalPermissionGate::with_sandbox(false, PipeWireRemote::default());
        assert!(gate.is_granted());
    }

    #[test]
    fn test_sandboxed_gate_starts_denied() {
        let gate = PortalPermissionGate::with_sandbox(true, PipeWireRemote::default());
        assert!(!gate.is_granted());
    }

    #[tokio::test]
    async fn test_unsandboxed_request_grants_without_portal() {
        let remote = PipeWireRemote::default();
        let gate = PortalPermissionGate::with_sandbox(false, remote.clone());
        assert_eq!(gate.request().await, PermissionStatus::Granted);
        assert!(gate.is_granted());
        // The session daemon is reachable directly, no portal remote needed
        assert_eq!(remote.raw_fd(), None);
    }
}
