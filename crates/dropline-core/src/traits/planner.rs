// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-planning provider seam.
//!
//! The provider is a data source and a best-effort sink: ingestion may
//! register a route for later reconciliation, and a confirmed reschedule
//! may push a new unassigned stop. Failures on this seam are logged by
//! callers and never fail the local state transition; the local record
//! is authoritative.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DroplineError;

/// A stop to be created on the route-planning provider after a reschedule.
#[derive(Debug, Clone)]
pub struct UnassignedStop {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub delivery_date: NaiveDate,
    pub product: Option<String>,
}

/// Adapter for the external route-planning provider.
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Register a route/plan identifier for later reconciliation.
    async fn register_route(&self, route_id: &str) -> Result<(), DroplineError>;

    /// Push a new unassigned stop for a rescheduled delivery.
    async fn push_unassigned_stop(&self, stop: UnassignedStop) -> Result<(), DroplineError>;
}
