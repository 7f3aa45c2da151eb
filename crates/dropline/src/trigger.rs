// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dropline trigger` command implementation.
//!
//! Operator force-fires invoke the very same batch functions as the
//! scheduled and admin paths, so behavior is identical whether a batch
//! fires by time, HTTP, or shell.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local};
use clap::Subcommand;
use dropline_config::model::DroplineConfig;
use dropline_core::DroplineError;
use dropline_oracle::{AnthropicClient, AnthropicSummaryWriter, SummaryWriter};
use dropline_sms::SmsClient;
use dropline_storage::Database;
use tracing::info;

/// Batch actions available to `dropline trigger`.
#[derive(Subcommand, Debug)]
pub enum TriggerBatch {
    /// Send tomorrow's customer delivery notices now.
    SendBatch,
    /// Send tomorrow's staff summary now.
    StaffSummary,
    /// Resend one notification by id.
    Resend { id: i64 },
}

/// Runs the `dropline trigger` command.
pub async fn run_trigger(
    config: DroplineConfig,
    batch: TriggerBatch,
) -> Result<(), DroplineError> {
    crate::serve::init_tracing(&config.app.log_level);

    let db = Database::open(&config.storage.database_path).await?;
    let sms = Arc::new(SmsClient::new(&config.sms)?);
    let target = Local::now().date_naive() + Days::new(1);

    match batch {
        TriggerBatch::SendBatch => {
            let report = dropline_scheduler::run_customer_batch(
                &db,
                sms.as_ref(),
                target,
                Duration::from_millis(config.scheduler.send_delay_ms),
            )
            .await?;
            info!(
                date = %target,
                attempted = report.attempted,
                sent = report.sent,
                failed = report.failed,
                "customer batch complete"
            );
            println!(
                "{}: attempted {}, sent {}, failed {}",
                target, report.attempted, report.sent, report.failed
            );
        }
        TriggerBatch::StaffSummary => {
            let writer: Option<Arc<dyn SummaryWriter>> = AnthropicClient::new(&config.oracle)
                .ok()
                .map(|client| {
                    Arc::new(AnthropicSummaryWriter::new(client)) as Arc<dyn SummaryWriter>
                });
            let staff_recipients: Vec<String> = config
                .scheduler
                .staff_numbers
                .iter()
                .filter_map(|n| dropline_core::phone::normalize(n))
                .collect();
            dropline_scheduler::run_staff_summary(
                &db,
                sms.as_ref(),
                writer.as_deref(),
                &staff_recipients,
                target,
            )
            .await?;
            println!("{target}: staff summary sent to {} recipient(s)", staff_recipients.len());
        }
        TriggerBatch::Resend { id } => {
            dropline_scheduler::resend_one(&db, sms.as_ref(), id).await?;
            println!("notification {id}: resend attempted, see activity log");
        }
    }

    db.close().await?;
    Ok(())
}
