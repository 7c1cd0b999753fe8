// SPDX-License-Identifier: MPL-2.0

//! Whistle Meme - take a photo, get a meme and a whistle
//!
//! A novelty camera for the COSMIC desktop: it opens a live preview, takes a
//! single photo, freezes it on screen, fades a meme in over it and whistles.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application UI and the capture-and-reveal flow
//! - [`backends`]: Camera, permission portal and sound cue
//! - [`pipelines`]: Turning a raw still into an upright image
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // whistle-meme
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod pipelines;

// Re-export commonly used types
pub use app::flow::{CaptureFlow, FlowState};
pub use app::{AppModel, Flags, Message};
pub use config::Config;
