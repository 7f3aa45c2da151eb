// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! External collaborators sit behind these seams so the engines can be
//! tested with fakes and never depend on a live gateway or provider.

pub mod planner;
pub mod sms;

pub use planner::{RoutePlanner, UnassignedStop};
pub use sms::SmsSender;
