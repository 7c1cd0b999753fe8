// SPDX-License-Identifier: MPL-2.0

//! Camera preview module
//!
//! Shows the live preview while the flow is live.

pub mod widget;
