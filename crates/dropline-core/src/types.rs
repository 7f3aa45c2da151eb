// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain enumerations shared across the Dropline workspace.
//!
//! Delivery status and conversation state are independent axes. The
//! permitted combinations:
//!
//! | `status`    | `customer_response` | `conversation_state`           |
//! |-------------|---------------------|--------------------------------|
//! | `pending`   | `null`              | `none`                         |
//! | `sent`      | `null`              | `none`                         |
//! | `sent`      | `no`                | `rescheduling` / `rescheduled` / `handoff` |
//! | `sent`      | `stop`              | `none` (reset on opt-out)      |
//! | `delivered` | `yes`               | `none`                         |
//! | `failed`    | `null`              | `none`                         |
//! | `cancelled` | any                 | any (administrative)           |
//!
//! A non-`none` conversation state is only ever entered after a `no`
//! response, and a rescheduled delivery is a new `pending` row referencing
//! the original via `rescheduled_from`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Delivery lifecycle status of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Awaiting the daily customer-send batch.
    Pending,
    /// SMS accepted by the gateway; awaiting a customer reply.
    Sent,
    /// SMS send failed; retry_count records attempts.
    Failed,
    /// Customer confirmed with YES.
    Delivered,
    /// Administratively cancelled; excluded from all batches.
    Cancelled,
}

/// Classified customer reply, if any.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerResponse {
    Yes,
    No,
    Stop,
}

/// Sub-state machine tracking an active rescheduling dialogue,
/// independent of delivery status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationState {
    /// No rescheduling dialogue.
    None,
    /// Negotiating a new date with the customer.
    Rescheduling,
    /// A new date was validated; a fresh pending row references this one.
    Rescheduled,
    /// A human must take over; no further automated turns.
    Handoff,
}

/// Author of one turn in a rescheduling conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// A message Dropline sent to the customer.
    Assistant,
    /// A message the customer texted back.
    Customer,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
