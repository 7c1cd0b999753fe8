// SPDX-License-Identifier: MPL-2.0

//! End-to-end tests of the capture-and-reveal flow with fake collaborators

use futures::channel::oneshot;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use whistle_meme::backends::camera::{
    BackendError, BackendResult, CameraDevice, CameraFrame, CaptureProvider, FrameSender,
    SensorRotation, StillCapture, StillReceiver,
};
use whistle_meme::backends::permission::{PermissionGate, PermissionStatus};
use whistle_meme::backends::sound::SoundCue;
use whistle_meme::errors::AppResult;
use whistle_meme::pipelines::photo::PhotoPipeline;
use whistle_meme::{CaptureFlow, FlowState};

#[derive(Default)]
struct FakeSound {
    plays: AtomicUsize,
}

impl SoundCue for FakeSound {
    fn play(&self) -> AppResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeGate {
    answer: PermissionStatus,
}

impl PermissionGate for FakeGate {
    fn is_granted(&self) -> bool {
        false
    }

    fn request(&self) -> futures::future::BoxFuture<'static, PermissionStatus> {
        let answer = self.answer;
        Box::pin(async move { answer })
    }
}

/// Camera whose preview either binds or fails, and whose stills are
/// completed by the test through `deliver`
struct FakeCamera {
    device: CameraDevice,
    bind_error: Option<BackendError>,
    pending: Mutex<Option<oneshot::Sender<StillCapture>>>,
}

impl FakeCamera {
    fn new(rotation: SensorRotation) -> Self {
        Self {
            device: CameraDevice {
                rotation,
                ..CameraDevice::default_source()
            },
            bind_error: None,
            pending: Mutex::new(None),
        }
    }

    fn failing(error: BackendError) -> Self {
        Self {
            bind_error: Some(error),
            ..Self::new(SensorRotation::None)
        }
    }

    fn deliver(&self, frame: CameraFrame) {
        let sender = self.pending.lock().unwrap().take().expect("no pending still");
        sender
            .send(StillCapture {
                frame,
                rotation: self.device.rotation,
            })
            .unwrap();
    }
}

impl CaptureProvider for FakeCamera {
    fn start_preview(&self, _frames: FrameSender) -> BackendResult<()> {
        match &self.bind_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn stop_preview(&self) {
        self.pending.lock().unwrap().take();
    }

    fn capture(&self) -> BackendResult<StillReceiver> {
        let mut pending = self.pending.lock().unwrap();
        if pending.is_some() {
            return Err(BackendError::CaptureInProgress);
        }
        let (sender, receiver) = oneshot::channel();
        *pending = Some(sender);
        Ok(receiver)
    }

    fn device(&self) -> &CameraDevice {
        &self.device
    }
}

/// 3x2 raw buffer, pixel value = index
fn raw_frame() -> CameraFrame {
    let data: Vec<u8> = (0..6u8).flat_map(|i| [i, i, i, 255]).collect();
    CameraFrame {
        width: 3,
        height: 2,
        data: Arc::from(data),
        stride: 12,
        captured_at: Instant::now(),
    }
}

#[tokio::test]
async fn test_denied_permission_shows_only_request() {
    let gate = FakeGate {
        answer: PermissionStatus::Denied,
    };
    let mut flow = CaptureFlow::new(gate.is_granted(), Arc::new(FakeSound::default()));

    for _ in 0..3 {
        if gate.request().await.is_granted() {
            flow.on_permission_granted();
        }
        assert_eq!(flow.state(), FlowState::AwaitingPermission);
    }
    assert!(!flow.begin_capture());
}

#[tokio::test]
async fn test_granted_permission_makes_capture_available() {
    let gate = FakeGate {
        answer: PermissionStatus::Granted,
    };
    let mut flow = CaptureFlow::new(gate.is_granted(), Arc::new(FakeSound::default()));

    assert!(gate.request().await.is_granted());
    assert!(flow.on_permission_granted());
    assert_eq!(flow.state(), FlowState::Live);
    assert!(flow.can_capture());
}

#[tokio::test]
async fn test_rotated_capture_is_revealed_with_whistle() {
    let sound = Arc::new(FakeSound::default());
    let camera = Arc::new(FakeCamera::new(SensorRotation::Rotate90));
    let photo = PhotoPipeline::new(camera.clone());
    let mut flow = CaptureFlow::new(true, sound.clone());

    let (sender, _receiver) = futures::channel::mpsc::channel(1);
    camera.start_preview(sender).unwrap();

    assert!(flow.begin_capture());
    let pending = photo.capture();
    assert!(!flow.begin_capture(), "second press must be ignored");

    camera.deliver(raw_frame());
    let image = pending.await.unwrap();

    // Raw 3x2:      Rotated 90° clockwise (2x3):
    //   0 1 2          3 0
    //   3 4 5          4 1
    //                  5 2
    assert_eq!((image.width(), image.height()), (2, 3));
    let expected = [[3, 0], [4, 1], [5, 2]];
    for (y, row) in expected.iter().enumerate() {
        for (x, value) in row.iter().enumerate() {
            assert_eq!(image.pixels().get_pixel(x as u32, y as u32).0[0], *value);
        }
    }

    let t0 = Instant::now();
    assert!(flow.on_image_captured(image, t0));
    assert_eq!(flow.state(), FlowState::Revealed);
    assert_eq!(sound.plays.load(Ordering::SeqCst), 1);

    let mid = flow.reveal_opacity(t0 + Duration::from_millis(1500));
    assert!(mid > 0.0 && mid < 1.0);
    assert!(flow.is_revealing(t0 + Duration::from_millis(1500)));
    assert_eq!(flow.reveal_opacity(t0 + Duration::from_millis(3000)), 1.0);
    assert!(!flow.is_revealing(t0 + Duration::from_millis(3000)));

    // A late duplicate result changes nothing
    let (sender, _receiver) = futures::channel::mpsc::channel(1);
    camera.start_preview(sender).unwrap();
    let late = photo.capture();
    camera.deliver(raw_frame());
    assert!(!flow.on_image_captured(late.await.unwrap(), Instant::now()));
    assert_eq!(sound.plays.load(Ordering::SeqCst), 1);
}

#[test]
fn test_binding_error_stays_live_without_preview() {
    let camera = FakeCamera::failing(BackendError::NotAvailable("pipewiresrc".to_string()));
    let mut flow = CaptureFlow::new(true, Arc::new(FakeSound::default()));

    let (sender, _receiver) = futures::channel::mpsc::channel(1);
    let error = camera.start_preview(sender).unwrap_err();
    flow.on_preview_failed(&error);

    assert_eq!(flow.state(), FlowState::Live);
    assert!(flow.preview_failed());
}

#[tokio::test]
async fn test_stopped_preview_fails_capture_and_allows_retry() {
    let camera = Arc::new(FakeCamera::new(SensorRotation::None));
    let photo = PhotoPipeline::new(camera.clone());
    let mut flow = CaptureFlow::new(true, Arc::new(FakeSound::default()));

    assert!(flow.begin_capture());
    let pending = photo.capture();
    camera.stop_preview();

    let error = pending.await.unwrap_err();
    flow.on_capture_failed(&error);
    assert_eq!(flow.state(), FlowState::Live);
    assert!(flow.begin_capture());
}
