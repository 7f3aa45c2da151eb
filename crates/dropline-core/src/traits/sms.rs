// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound SMS seam.

use async_trait::async_trait;

use crate::error::DroplineError;
use crate::types::HealthStatus;

/// Adapter for sending SMS messages through an external gateway.
///
/// `to` must already be normalized to E.164 (see [`crate::phone`]).
/// On success, returns the provider's message identifier.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, DroplineError>;

    /// Reports whether the gateway is reachable and credentials are valid.
    async fn health_check(&self) -> Result<HealthStatus, DroplineError> {
        Ok(HealthStatus::Healthy)
    }
}
