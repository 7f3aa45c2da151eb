// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Dropline integration tests.
//!
//! Provides an in-memory mock SMS sender, a scripted fake extraction
//! oracle, and a tempdir-backed storage harness, so every core flow is
//! testable without live credentials.

pub mod fake_oracle;
pub mod harness;
pub mod mock_sms;

pub use fake_oracle::FakeOracle;
pub use harness::StorageHarness;
pub use mock_sms::{MockSms, SentSms};
