// SPDX-License-Identifier: GPL-3.0-only

//! Whistle sound cue
//!
//! Plays the embedded WAV once through GStreamer. Each call builds its own
//! short-lived pipeline, so overlapping cues never share state.

use crate::errors::{AppError, AppResult};
use gstreamer::prelude::*;
use gstreamer_app::AppSrc;
use tracing::{debug, info, warn};

/// Embedded whistle sound (16-bit PCM WAV)
pub static WHISTLE_WAV: &[u8] = include_bytes!("../../resources/sounds/whistle.wav");

/// Sound collaborator used when the meme is revealed
pub trait SoundCue: Send + Sync {
    /// Start playback. Returns once playback has started, not when it ends.
    fn play(&self) -> AppResult<()>;
}

/// GStreamer playback of an in-memory WAV
#[derive(Debug, Clone)]
pub struct GstSoundCue {
    wav: &'static [u8],
}

impl GstSoundCue {
    pub fn new() -> Self {
        Self::with_wav(WHISTLE_WAV)
    }

    pub fn with_wav(wav: &'static [u8]) -> Self {
        Self { wav }
    }
}

impl Default for GstSoundCue {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundCue for GstSoundCue {
    fn play(&self) -> AppResult<()> {
        gstreamer::init().map_err(|e| AppError::Sound(format!("GStreamer init failed: {}", e)))?;

        let pipeline = gstreamer::parse::launch(
            "appsrc name=src ! wavparse ! audioconvert ! audioresample ! autoaudiosink",
        )
        .map_err(|e| AppError::Sound(format!("Failed to build pipeline: {}", e)))?
        .dynamic_cast::<gstreamer::Pipeline>()
        .map_err(|_| AppError::Sound("Failed to cast to pipeline".to_string()))?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or_else(|| AppError::Sound("Failed to get appsrc".to_string()))?
            .downcast::<AppSrc>()
            .map_err(|_| AppError::Sound("Failed to downcast to AppSrc".to_string()))?;

        appsrc.set_format(gstreamer::Format::Bytes);
        appsrc
            .push_buffer(gstreamer::Buffer::from_slice(self.wav))
            .map_err(|e| AppError::Sound(format!("Failed to push buffer: {:?}", e)))?;
        appsrc
            .end_of_stream()
            .map_err(|e| AppError::Sound(format!("Failed to send EOS: {:?}", e)))?;

        if let Err(e) = pipeline.set_state(gstreamer::State::Playing) {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(AppError::Sound(format!("Failed to start playback: {}", e)));
        }

        let bus = release_on_error(
            &pipeline,
            pipeline
                .bus()
                .ok_or_else(|| AppError::Sound("Pipeline has no bus".to_string())),
        )?;

        let watched = pipeline.clone();
        let spawned = std::thread::Builder::new()
            .name("whistle-playback".to_string())
            .spawn(move || {
                let msg = bus.timed_pop_filtered(
                    gstreamer::ClockTime::NONE,
                    &[gstreamer::MessageType::Eos, gstreamer::MessageType::Error],
                );
                match msg.as_ref().map(|m| m.view()) {
                    Some(gstreamer::MessageView::Error(err)) => {
                        warn!(error = %err.error(), debug = ?err.debug(), "Whistle playback failed");
                    }
                    _ => debug!("Whistle playback finished"),
                }
                let _ = watched.set_state(gstreamer::State::Null);
            })
            .map_err(|e| AppError::Sound(format!("Spawn playback thread: {}", e)));
        release_on_error(&pipeline, spawned)?;

        info!("Whistle playing");
        Ok(())
    }
}

/// Stop a playing pipeline when nothing is left to tear it down
fn release_on_error<T>(pipeline: &gstreamer::Pipeline, result: AppResult<T>) -> AppResult<T> {
    if result.is_err() {
        let _ = pipeline.set_state(gstreamer::State::Null);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_whistle_is_wav() {
        assert!(WHISTLE_WAV.len() > 44);
        assert_eq!(&WHISTLE_WAV[0..4], b"RIFF");
        assert_eq!(&WHISTLE_WAV[8..12], b"WAVE");
    }

    #[test]
    fn test_failed_start_releases_pipeline() {
        gstreamer::init().unwrap();
        let pipeline = gstreamer::Pipeline::new();
        pipeline.set_state(gstreamer::State::Playing).unwrap();

        let kept = release_on_error(&pipeline, Ok(7));
        assert_eq!(kept.unwrap(), 7);

        let failed: AppResult<()> = Err(AppError::Sound("spawn failed".to_string()));
        assert!(release_on_error(&pipeline, failed).is_err());
        assert_eq!(pipeline.current_state(), gstreamer::State::Null);
    }
}
