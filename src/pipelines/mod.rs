// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines between the camera and the screen
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │ Still Frame  │ ──▶ │  Photo Pipeline   │ ──▶ │ CapturedImage  │
//! │ (RGBA + rot) │     │  - stride repack  │     │ (upright RGBA) │
//! │              │     │  - rotation       │     │                │
//! └──────────────┘     └───────────────────┘     └────────────────┘
//! ```
//!
//! Pixel work runs on blocking workers so the preview keeps updating.
//!
//! - [`photo`]: single still capture turned upright for display

pub mod photo;
