// SPDX-License-Identifier: MPL-2.0

//! Capture controls module
//!
//! - Permission request button
//! - Capture button

pub mod capture_button;
pub mod permission_button;
