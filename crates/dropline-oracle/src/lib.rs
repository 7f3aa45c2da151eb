// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Natural-language oracle adapters for the Dropline delivery notifier.
//!
//! Two seams over one Anthropic Messages API client: free-text date
//! extraction for the reschedule engine, and optional staff-summary
//! rendering for the scheduler. Both are traits so the core flows are
//! testable without ever touching the real API.

pub mod client;
pub mod extractor;
pub mod summary;
pub mod types;

pub use client::AnthropicClient;
pub use extractor::{AnthropicExtractor, ExtractionOracle, ExtractionRequest};
pub use summary::{AnthropicSummaryWriter, SummaryWriter};
pub use types::SchedulingIntent;
