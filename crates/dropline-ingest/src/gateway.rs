// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ingestion gateway.
//!
//! Converts normalized stops into pending notifications: phone and date
//! are mandatory, the delivery date must land on a valid delivery day for
//! the resolved store, and a repeated external identifier is an idempotent
//! no-op. Everything dropped is logged to the activity log, never erred.

use std::sync::Arc;

use chrono::NaiveDate;
use dropline_config::DeliveryPolicies;
use dropline_core::{DeliveryWindow, DroplineError, RoutePlanner};
use dropline_storage::{Database, NewNotification};
use dropline_storage::queries::{activity, notifications};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::payload::{self, RawStop};

/// Outcome of one ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Converts inbound delivery events into pending notifications.
pub struct IngestionGateway {
    db: Database,
    policies: DeliveryPolicies,
    planner: Option<Arc<dyn RoutePlanner>>,
}

impl IngestionGateway {
    pub fn new(
        db: Database,
        policies: DeliveryPolicies,
        planner: Option<Arc<dyn RoutePlanner>>,
    ) -> Self {
        Self {
            db,
            policies,
            planner,
        }
    }

    /// Ingest one inbound payload of any recognized shape.
    pub async fn ingest(&self, payload: Value) -> Result<IngestReport, DroplineError> {
        let normalized = payload::normalize(payload);

        for fragment in &normalized.unrecognized {
            warn!("unrecognized delivery payload shape");
            activity::record(
                &self.db,
                "ingest.unrecognized",
                &truncate(&fragment.to_string(), 200),
                None,
            )
            .await?;
        }

        // Best-effort route registration for later reconciliation; the
        // core invariant does not depend on it.
        if let Some(planner) = &self.planner {
            for route_id in &normalized.route_ids {
                if let Err(e) = planner.register_route(route_id).await {
                    warn!(%route_id, error = %e, "route registration failed");
                    activity::record(
                        &self.db,
                        "provider.register_failed",
                        &format!("route {route_id}: {e}"),
                        None,
                    )
                    .await?;
                }
            }
        }

        let mut report = IngestReport::default();
        for stop in normalized.stops {
            self.ingest_stop(stop, &mut report).await?;
        }

        info!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "ingestion complete"
        );
        Ok(report)
    }

    async fn ingest_stop(
        &self,
        stop: RawStop,
        report: &mut IngestReport,
    ) -> Result<(), DroplineError> {
        let label = stop.id.clone().unwrap_or_else(|| "<no id>".to_string());

        let Some(phone) = stop.phone.as_deref().and_then(dropline_core::phone::normalize)
        else {
            report.skipped += 1;
            debug!(stop = %label, "skipping stop without usable phone");
            activity::record(
                &self.db,
                "ingest.skip",
                &format!("stop {label}: missing or unusable phone"),
                None,
            )
            .await?;
            return Ok(());
        };

        let Some(date) = stop.date.as_deref().and_then(parse_delivery_date) else {
            report.skipped += 1;
            activity::record(
                &self.db,
                "ingest.skip",
                &format!("stop {label}: missing or unparseable delivery date"),
                None,
            )
            .await?;
            return Ok(());
        };

        let store = self
            .policies
            .resolve_store(stop.classification.as_deref())
            .to_string();

        if !self.policies.is_valid_delivery_day(&store, date) {
            report.skipped += 1;
            debug!(stop = %label, store = %store, date = %date, "dropping off-day stop");
            activity::record(
                &self.db,
                "ingest.skip",
                &format!("stop {label}: {date} is not a valid delivery day for {store}"),
                None,
            )
            .await?;
            return Ok(());
        }

        let window = stop
            .time
            .as_deref()
            .map(DeliveryWindow::from_raw)
            .unwrap_or_else(|| DeliveryWindow::from_minutes(dropline_core::window::FALLBACK_MINUTES));

        let new = NewNotification {
            external_id: stop.id.clone(),
            customer_name: stop.name.unwrap_or_default(),
            phone,
            store,
            address: stop.address.unwrap_or_default(),
            delivery_date: date,
            time_window: window.to_string(),
            raw_time: stop.time,
            product: stop.product,
            driver: stop.driver,
            rescheduled_from: None,
        };

        match notifications::insert(&self.db, &new).await? {
            Some(id) => {
                report.inserted += 1;
                info!(notification_id = id, stop = %label, "notification created");
                activity::record(
                    &self.db,
                    "ingest.created",
                    &format!("stop {label} scheduled for {date}"),
                    Some(id),
                )
                .await?;
            }
            None => {
                report.duplicates += 1;
                debug!(stop = %label, "duplicate stop ignored");
                activity::record(
                    &self.db,
                    "ingest.duplicate",
                    &format!("stop {label} already ingested"),
                    None,
                )
                .await?;
            }
        }

        Ok(())
    }
}

/// Parse the provider's delivery date forms.
fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    // Full timestamps carry the date up front.
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_local().date())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}
