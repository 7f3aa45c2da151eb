// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily batch scheduler for the Dropline delivery notifier.
//!
//! Two independent triggers (customer send, staff summary) fire exactly
//! once per calendar day each, driven by minute-granularity polling with
//! an eager catch-up check at startup. The batch functions are public so
//! the admin trigger surface and the CLI invoke the very same code paths.

pub mod batches;
pub mod engine;
pub mod trigger;

pub use batches::{BatchReport, resend_one, run_customer_batch, run_staff_summary};
pub use engine::SchedulerEngine;
pub use trigger::TriggerState;
