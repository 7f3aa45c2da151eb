// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply classification and rescheduling engine.
//!
//! [`Engine`] owns the two reply-driven state machines: classifying
//! inbound SMS against the most recent sent notification, and driving a
//! rescheduling conversation through the extraction oracle with mandatory
//! server-side date validation. Delivery status and conversation state
//! evolve on independent axes (see `dropline_core::types`).

pub mod messages;
pub mod reply;
pub mod reschedule;
pub mod validate;

use std::sync::Arc;

use dropline_config::DeliveryPolicies;
use dropline_core::{RoutePlanner, SmsSender};
use dropline_oracle::ExtractionOracle;
use dropline_storage::Database;
use tracing::warn;

pub use validate::{DateRejection, validate_proposed_date};

/// The reply/reschedule engine.
///
/// One instance serves the whole process; every webhook event is handled
/// to completion before the next begins, so there is no per-notification
/// locking here.
pub struct Engine {
    db: Database,
    sms: Arc<dyn SmsSender>,
    oracle: Arc<dyn ExtractionOracle>,
    planner: Option<Arc<dyn RoutePlanner>>,
    policies: DeliveryPolicies,
}

impl Engine {
    pub fn new(
        db: Database,
        sms: Arc<dyn SmsSender>,
        oracle: Arc<dyn ExtractionOracle>,
        planner: Option<Arc<dyn RoutePlanner>>,
        policies: DeliveryPolicies,
    ) -> Self {
        Self {
            db,
            sms,
            oracle,
            planner,
            policies,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Send an auto-reply, logging failures without rolling anything back.
    ///
    /// Classification and conversation turns are committed before any
    /// reply attempt; a gateway failure here only costs the customer a
    /// courtesy message.
    pub(crate) async fn send_best_effort(&self, to: &str, body: &str) {
        if let Err(e) = self.sms.send_sms(to, body).await {
            warn!(to, error = %e, "auto-reply send failed");
            let _ = dropline_storage::queries::activity::record(
                &self.db,
                "sms.reply_failed",
                &format!("to {to}: {e}"),
                None,
            )
            .await;
        }
    }
}
