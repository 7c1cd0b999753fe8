// SPDX-License-Identifier: MPL-2.0

//! Platform collaborators of the capture flow
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             Capture Flow (app)               │
//! └──────┬──────────────┬──────────────┬────────┘
//!        │              │              │
//! ┌──────┴──────┐ ┌─────┴──────┐ ┌─────┴──────┐
//! │   Camera    │ │ Permission │ │   Sound    │
//! │ (PipeWire)  │ │  (portal)  │ │ (GStreamer)│
//! └─────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! - [`camera`]: device enumeration, live preview and still capture
//! - [`permission`]: camera access through the XDG desktop portal
//! - [`sound`]: the whistle played when the meme is revealed

pub mod camera;
pub mod permission;
pub mod sound;
