// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Meme reveal animation
pub mod reveal {
    use super::Duration;

    /// Overlay fade-in duration
    pub const FADE_DURATION: Duration = Duration::from_millis(3000);

    /// Ease-in cubic Bézier control points (x1, y1, x2, y2)
    pub const EASE_IN: (f32, f32, f32, f32) = (0.42, 0.0, 1.0, 1.0);

    /// Overlay image width in logical pixels
    pub const OVERLAY_WIDTH: f32 = 300.0;

    /// Overlay image height in logical pixels
    pub const OVERLAY_HEIGHT: f32 = 200.0;
}

/// UI layout constants
pub mod ui {
    /// Capture button size (outer)
    pub const CAPTURE_BUTTON_OUTER: f32 = 60.0;

    /// Capture button size (inner)
    pub const CAPTURE_BUTTON_INNER: f32 = 50.0;

    /// Capture button border radius
    pub const CAPTURE_BUTTON_RADIUS: f32 = 25.0;

    /// Gap between the capture button and the bottom edge
    pub const CAPTURE_BUTTON_BOTTOM_PADDING: u16 = 16;

    /// Capture button label text size
    pub const CAPTURE_LABEL_TEXT_SIZE: u16 = 14;

    /// Minimum window width
    pub const MIN_WINDOW_WIDTH: f32 = 360.0;

    /// Minimum window height
    pub const MIN_WINDOW_HEIGHT: f32 = 240.0;
}

/// GStreamer preview pipeline
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// Frames buffered between the appsink thread and the UI
    pub const PREVIEW_CHANNEL_CAPACITY: usize = 4;
}

/// Timing constants
pub mod timing {
    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;
}
