// SPDX-License-Identifier: MPL-2.0

//! PipeWire GStreamer pipeline for camera preview and still capture

use super::super::types::*;
use crate::constants::{pipeline, timing};
use futures::channel::oneshot;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Slot holding the sender of the still capture waiting for the next frame
type StillSlot = Arc<Mutex<Option<oneshot::Sender<StillCapture>>>>;

/// PipeWire camera pipeline
///
/// `pipewiresrc ! videoconvert ! RGBA appsink`. Every frame goes to the
/// preview channel; the first frame after a still request also completes it.
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    still: StillSlot,
}

impl PipeWirePipeline {
    /// Create and start a pipeline for `device`
    ///
    /// `remote_fd` is the portal's PipeWire connection when sandboxed.
    pub fn new(
        device: &CameraDevice,
        remote_fd: Option<RawFd>,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(
            device = %device.name,
            path = %device.path,
            portal_remote = remote_fd.is_some(),
            "Creating PipeWire pipeline"
        );

        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc").ok_or_else(|| {
            BackendError::NotAvailable("pipewiresrc not available: factory not found".to_string())
        })?;

        let pipeline_str = build_pipeline_string(&device.path, remote_fd);
        info!(pipeline = %pipeline_str, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&pipeline_str)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast to pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast appsink".to_string())
            })?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false); // Lowest latency
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        let still: StillSlot = Arc::new(Mutex::new(None));
        let callback_still = Arc::clone(&still);
        let rotation = device.rotation;

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;

                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }

                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                        error!(frame = frame_num, error = ?e, "Failed to get video info");
                        gstreamer::FlowError::Error
                    })?;

                    let map = buffer.map_readable().map_err(|e| {
                        error!(frame = frame_num, error = ?e, "Failed to map buffer");
                        gstreamer::FlowError::Error
                    })?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        data: Arc::from(map.as_slice()),
                        stride: video_info.stride()[0] as u32,
                        captured_at: frame_start,
                    };

                    // Complete a pending still before feeding the preview
                    let pending = callback_still.lock().ok().and_then(|mut slot| slot.take());
                    if let Some(sender) = pending {
                        info!(
                            frame = frame_num,
                            width = frame.width,
                            height = frame.height,
                            %rotation,
                            "Delivering still capture"
                        );
                        let still = StillCapture {
                            frame: frame.clone(),
                            rotation,
                        };
                        if sender.send(still).is_err() {
                            debug!("Still capture receiver dropped");
                        }
                    }

                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        if e.is_disconnected() {
                            return Err(gstreamer::FlowError::Flushing);
                        }
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, "Frame dropped (channel full)");
                        }
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state");

        if let Some(err) = first_bus_error(&pipeline) {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(err));
        }

        if result.is_err() {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(
                "Pipeline failed to reach PLAYING".to_string(),
            ));
        }

        if state != gstreamer::State::Playing {
            warn!(?state, ?pending, "Pipeline is not in PLAYING state yet");
        }

        info!("PipeWire camera preview bound");

        Ok(Self {
            pipeline,
            appsink,
            still,
        })
    }

    /// Ask for the next frame as a still
    pub fn request_still(&self) -> BackendResult<StillReceiver> {
        let mut slot = self
            .still
            .lock()
            .map_err(|_| BackendError::Other("Still capture slot poisoned".to_string()))?;

        if slot.as_ref().is_some_and(|sender| !sender.is_canceled()) {
            return Err(BackendError::CaptureInProgress);
        }

        let (sender, receiver) = oneshot::channel();
        *slot = Some(sender);
        debug!("Still capture armed");
        Ok(receiver)
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        info!("Stopping PipeWire pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        // Dropping the sender resolves a pending still as cancelled
        if let Ok(mut slot) = self.still.lock() {
            slot.take();
        }

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to stop pipeline");
            return;
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, "PipeWire pipeline stopped");
    }
}

/// Build the `gst-launch` description for a PipeWire target
///
/// An empty path lets PipeWire pick its default video source.
fn build_pipeline_string(path: &str, remote_fd: Option<RawFd>) -> String {
    let remote = remote_fd
        .map(|fd| format!(" fd={}", fd))
        .unwrap_or_default();
    let target = if path.is_empty() {
        String::new()
    } else {
        format!(" target-object={}", path)
    };

    format!(
        "pipewiresrc{}{} do-timestamp=true ! videoconvert ! video/x-raw,format={} ! appsink name=sink",
        remote,
        target,
        pipeline::OUTPUT_FORMAT
    )
}

/// Drain the bus and return the first error message, if any
fn first_bus_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    while let Some(msg) = bus.pop() {
        if let gstreamer::MessageView::Error(err) = msg.view() {
            error!(error = %err.error(), debug = ?err.debug(), "Pipeline error");
            return Some(err.error().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_string_default_source() {
        assert_eq!(
            build_pipeline_string("", None),
            "pipewiresrc do-timestamp=true ! videoconvert ! video/x-raw,format=RGBA ! appsink name=sink"
        );
    }

    #[test]
    fn test_pipeline_string_targets_serial() {
        let s = build_pipeline_string("58", None);
        assert!(s.starts_with("pipewiresrc target-object=58 do-timestamp=true"));
        assert!(s.ends_with("appsink name=sink"));
    }

    #[test]
    fn test_pipeline_string_uses_portal_remote() {
        let s = build_pipeline_string("", Some(23));
        assert!(s.starts_with("pipewiresrc fd=23 do-timestamp=true"));

        let s = build_pipeline_string("58", Some(23));
        assert!(s.starts_with("pipewiresrc fd=23 target-object=58 "));
    }
}
