// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery-event ingestion for the Dropline delivery notifier.
//!
//! Payload recognition is a tagged union over the provider's wire shapes;
//! ingestion enforces the phone requirement, valid-day policy, and
//! external-id idempotency, and logs every drop to the activity log.

pub mod gateway;
pub mod payload;

pub use gateway::{IngestReport, IngestionGateway};
pub use payload::{DeliveryPayload, NormalizedStops, RawStop};
