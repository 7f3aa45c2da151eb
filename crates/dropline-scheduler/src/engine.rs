// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The polling scheduler.
//!
//! Cooperative single-task polling: one eager check at startup (so a
//! restart after the threshold fires immediately rather than waiting for
//! tomorrow), then a minute-granularity interval. Firing anywhere within
//! the minute after the threshold is deliberate coarseness.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime};
use dropline_core::{DroplineError, SmsSender};
use dropline_oracle::SummaryWriter;
use dropline_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use dropline_config::model::SchedulerConfig;

use crate::batches;
use crate::trigger::TriggerState;

/// Drives the customer-send and staff-summary triggers.
pub struct SchedulerEngine {
    db: Database,
    sms: Arc<dyn SmsSender>,
    writer: Option<Arc<dyn SummaryWriter>>,
    customer: TriggerState,
    staff: TriggerState,
    staff_recipients: Vec<String>,
    send_delay: Duration,
}

impl SchedulerEngine {
    pub fn new(
        db: Database,
        sms: Arc<dyn SmsSender>,
        writer: Option<Arc<dyn SummaryWriter>>,
        config: &SchedulerConfig,
    ) -> Result<Self, DroplineError> {
        let customer =
            TriggerState::from_names(config.send_hour, config.send_minute, &config.weekdays)?;
        let staff =
            TriggerState::from_names(config.summary_hour, config.summary_minute, &config.weekdays)?;

        let staff_recipients = config
            .staff_numbers
            .iter()
            .filter_map(|n| dropline_core::phone::normalize(n))
            .collect();

        Ok(Self {
            db,
            sms,
            writer,
            customer,
            staff,
            staff_recipients,
            send_delay: Duration::from_millis(config.send_delay_ms),
        })
    }

    /// Run until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            customer = %format!("{:02}:{:02}", self.customer.hour, self.customer.minute),
            staff = %format!("{:02}:{:02}", self.staff.hour, self.staff.minute),
            "scheduler started"
        );

        // Eager startup check: a restart after the threshold fires now.
        self.tick(Local::now().naive_local()).await;

        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(Local::now().naive_local()).await;
                }
                _ = cancel.cancelled() => {
                    info!("scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// Evaluate both triggers at `now`, firing any that are due.
    ///
    /// The guard is marked before the batch runs: a batch error must not
    /// re-fire on the next tick, per the at-most-once-per-date contract.
    pub async fn tick(&mut self, now: NaiveDateTime) {
        let today = now.date();
        // Both batches address the following calendar day.
        let target = today + Days::new(1);

        if self.customer.due(now) {
            self.customer.mark_fired(today);
            info!(date = %target, "customer-send trigger fired");
            if let Err(e) =
                batches::run_customer_batch(&self.db, self.sms.as_ref(), target, self.send_delay)
                    .await
            {
                error!(error = %e, "customer batch failed");
            }
        }

        if self.staff.due(now) {
            self.staff.mark_fired(today);
            info!(date = %target, "staff-summary trigger fired");
            if let Err(e) = batches::run_staff_summary(
                &self.db,
                self.sms.as_ref(),
                self.writer.as_deref(),
                &self.staff_recipients,
                target,
            )
            .await
            {
                error!(error = %e, "staff summary failed");
            }
        }
    }
}
