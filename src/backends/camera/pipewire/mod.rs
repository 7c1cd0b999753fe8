// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! Binds a single camera through GStreamer's `pipewiresrc` and serves still
//! captures from the running preview.
//!
//! Binding can wait seconds for GStreamer state changes, so the pipeline is
//! built without holding the slot lock. Every start and stop bumps a
//! generation; a pipeline finishing after a newer start or a stop is
//! discarded instead of installed.

mod pipeline;

pub use pipeline::PipeWirePipeline;

use super::CaptureProvider;
use super::enumeration::enumerate_cameras;
use super::select_device;
use super::types::*;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

struct SlotState<P> {
    generation: u64,
    current: Option<P>,
}

/// Holds the bound pipeline, locked only for swaps and lookups
struct PreviewSlot<P> {
    state: Mutex<SlotState<P>>,
}

impl<P> PreviewSlot<P> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                generation: 0,
                current: None,
            }),
        }
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, SlotState<P>>> {
        self.state
            .lock()
            .map_err(|_| BackendError::Other("Pipeline lock poisoned".to_string()))
    }

    /// Start a new binding. Returns its generation and the pipeline it replaces.
    fn begin(&self) -> BackendResult<(u64, Option<P>)> {
        let mut state = self.lock()?;
        state.generation += 1;
        Ok((state.generation, state.current.take()))
    }

    /// Install `pipeline` if no newer start or stop happened since `begin`
    ///
    /// A stale pipeline is handed back so the caller drops it outside the lock.
    fn install(&self, generation: u64, pipeline: P) -> BackendResult<Result<(), P>> {
        let mut state = self.lock()?;
        if state.generation != generation {
            return Ok(Err(pipeline));
        }
        state.current = Some(pipeline);
        Ok(Ok(()))
    }

    /// Invalidate pending bindings and take the bound pipeline
    fn clear(&self) -> BackendResult<Option<P>> {
        let mut state = self.lock()?;
        state.generation += 1;
        Ok(state.current.take())
    }

    fn with_current<T>(&self, f: impl FnOnce(&P) -> BackendResult<T>) -> BackendResult<T> {
        let state = self.lock()?;
        state.current.as_ref().ok_or(BackendError::NotBound).and_then(f)
    }

    fn is_bound(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.current.is_some())
            .unwrap_or(false)
    }
}

/// PipeWire capture provider
pub struct PipeWireCamera {
    /// Camera this provider opens
    device: CameraDevice,
    /// Portal connection, filled by the permission gate when sandboxed
    remote: PipeWireRemote,
    /// Active GStreamer pipeline, present while the preview is bound
    pipeline: PreviewSlot<PipeWirePipeline>,
}

impl PipeWireCamera {
    /// Create a provider for a specific device
    pub fn new(device: CameraDevice, remote: PipeWireRemote) -> Self {
        Self {
            device,
            remote,
            pipeline: PreviewSlot::new(),
        }
    }

    /// Enumerate cameras and open the preferred one
    ///
    /// Inside a sandbox `pw-dump` sees no cameras, so this falls back to the
    /// default source of the portal remote.
    pub fn detect(preferred: Option<&str>, remote: PipeWireRemote) -> Self {
        let cameras = enumerate_cameras();
        info!(count = cameras.len(), "PipeWire cameras enumerated");

        let device = select_device(&cameras, preferred);
        info!(
            name = %device.name,
            path = %device.path,
            rotation = %device.rotation,
            "Selected camera"
        );
        Self::new(device, remote)
    }
}

impl CaptureProvider for PipeWireCamera {
    fn start_preview(&self, frames: FrameSender) -> BackendResult<()> {
        let (generation, previous) = self.pipeline.begin()?;

        // Release the old pipeline before opening the device again
        drop(previous);

        let pipeline = PipeWirePipeline::new(&self.device, self.remote.raw_fd(), frames)?;
        if let Err(stale) = self.pipeline.install(generation, pipeline)? {
            info!("Preview stopped while binding, releasing new pipeline");
            drop(stale);
        }
        Ok(())
    }

    fn stop_preview(&self) {
        match self.pipeline.clear() {
            Ok(Some(pipeline)) => {
                drop(pipeline);
                info!("Camera preview released");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to release camera preview"),
        }
    }

    fn capture(&self) -> BackendResult<StillReceiver> {
        self.pipeline.with_current(PipeWirePipeline::request_still)
    }

    fn device(&self) -> &CameraDevice {
        &self.device
    }
}

impl std::fmt::Debug for PipeWireCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeWireCamera")
            .field("device", &self.device)
            .field("portal_remote", &self.remote.raw_fd().is_some())
            .field("bound", &self.pipeline.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_requires_bound_preview() {
        let camera = PipeWireCamera::new(CameraDevice::default_source(), PipeWireRemote::default());
        assert_eq!(camera.capture().err(), Some(BackendError::NotBound));
    }

    #[test]
    fn test_stop_without_preview_is_harmless() {
        let camera = PipeWireCamera::new(CameraDevice::default_source(), PipeWireRemote::default());
        camera.stop_preview();
        assert_eq!(camera.device().name, "Default Camera");
    }

    #[test]
    fn test_slot_unlocked_while_binding() {
        let slot = PreviewSlot::<&str>::new();
        let (generation, previous) = slot.begin().unwrap();
        assert!(previous.is_none());

        // A capture press during binding gets an answer instead of waiting
        assert_eq!(slot.with_current(|_| Ok(())), Err(BackendError::NotBound));

        assert_eq!(slot.install(generation, "bound").unwrap(), Ok(()));
        assert_eq!(slot.with_current(|p| Ok(*p)), Ok("bound"));
    }

    #[test]
    fn test_stop_during_binding_discards_pipeline() {
        let slot = PreviewSlot::<&str>::new();
        let (generation, _) = slot.begin().unwrap();

        assert_eq!(slot.clear().unwrap(), None);
        assert_eq!(slot.install(generation, "late").unwrap(), Err("late"));
        assert!(!slot.is_bound());
    }

    #[test]
    fn test_newer_start_wins() {
        let slot = PreviewSlot::<&str>::new();
        let (first, _) = slot.begin().unwrap();
        let (second, _) = slot.begin().unwrap();

        assert_eq!(slot.install(second, "second").unwrap(), Ok(()));
        assert_eq!(slot.install(first, "first").unwrap(), Err("first"));
        assert_eq!(slot.with_current(|p| Ok(*p)), Ok("second"));

        let (_, replaced) = slot.begin().unwrap();
        assert_eq!(replaced, Some("second"));
    }
}
