// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two daily batch actions.
//!
//! Both batches address deliveries scheduled for the day after the fire
//! date and are shared verbatim by the scheduler, the admin trigger
//! surface, and the CLI, so behavior is identical however they fire.

use std::time::Duration;

use chrono::NaiveDate;
use dropline_core::{DroplineError, SmsSender};
use dropline_engine::messages;
use dropline_oracle::SummaryWriter;
use dropline_storage::Database;
use dropline_storage::queries::{activity, notifications};
use tracing::{info, warn};

/// Outcome of one customer-send batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Send the delivery notice to every pending notification dated `date`.
///
/// Sends run sequentially with `delay` between messages as backpressure
/// against gateway rate limits. Each row transitions independently to
/// sent or failed; one failure never aborts the batch.
pub async fn run_customer_batch(
    db: &Database,
    sms: &dyn SmsSender,
    date: NaiveDate,
    delay: Duration,
) -> Result<BatchReport, DroplineError> {
    let pending = notifications::pending_for_date(db, date).await?;
    let mut report = BatchReport {
        attempted: pending.len(),
        ..Default::default()
    };
    info!(date = %date, count = pending.len(), "customer batch starting");

    for (i, n) in pending.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let body = messages::delivery_notice(n);
        match sms.send_sms(&n.phone, &body).await {
            Ok(sid) => {
                notifications::mark_sent(db, n.id, &sid).await?;
                activity::record(db, "batch.sent", &format!("provider id {sid}"), Some(n.id))
                    .await?;
                report.sent += 1;
            }
            Err(e) => {
                warn!(notification_id = n.id, error = %e, "batch send failed");
                notifications::mark_failed(db, n.id, &e.to_string()).await?;
                activity::record(db, "batch.failed", &e.to_string(), Some(n.id)).await?;
                report.failed += 1;
            }
        }
    }

    info!(
        date = %date,
        sent = report.sent,
        failed = report.failed,
        "customer batch complete"
    );
    Ok(report)
}

/// Resend one notification through the same transition semantics as the
/// batch path.
pub async fn resend_one(
    db: &Database,
    sms: &dyn SmsSender,
    id: i64,
) -> Result<(), DroplineError> {
    let Some(n) = notifications::get(db, id).await? else {
        return Err(DroplineError::Internal(format!("no notification {id}")));
    };

    let body = messages::delivery_notice(&n);
    match sms.send_sms(&n.phone, &body).await {
        Ok(sid) => {
            notifications::mark_sent(db, n.id, &sid).await?;
            activity::record(db, "resend.sent", &format!("provider id {sid}"), Some(n.id)).await
        }
        Err(e) => {
            warn!(notification_id = n.id, error = %e, "manual resend failed");
            notifications::mark_failed(db, n.id, &e.to_string()).await?;
            activity::record(db, "resend.failed", &e.to_string(), Some(n.id)).await
        }
    }
}

/// Send the staff digest for deliveries dated `date`.
///
/// The summary writer is optional and best-effort; when it is absent,
/// errors, or returns no content, the deterministic template goes out
/// instead. Per-recipient send failures are logged, never fatal.
pub async fn run_staff_summary(
    db: &Database,
    sms: &dyn SmsSender,
    writer: Option<&dyn SummaryWriter>,
    recipients: &[String],
    date: NaiveDate,
) -> Result<(), DroplineError> {
    if recipients.is_empty() {
        info!("staff summary skipped: no recipients configured");
        return Ok(());
    }

    let counts = notifications::counts_for_date(db, date).await?;
    let stats = messages::stats_line(&counts);

    let text = match writer {
        Some(w) => match w.summarize(date, &stats).await {
            Ok(Some(rendered)) => rendered,
            Ok(None) => messages::staff_fallback(date, &counts),
            Err(e) => {
                warn!(error = %e, "summary writer failed, using fallback template");
                activity::record(db, "summary.writer_failed", &e.to_string(), None).await?;
                messages::staff_fallback(date, &counts)
            }
        },
        None => messages::staff_fallback(date, &counts),
    };

    for recipient in recipients {
        match sms.send_sms(recipient, &text).await {
            Ok(_) => {
                activity::record(db, "summary.sent", &format!("to {recipient}"), None).await?;
            }
            Err(e) => {
                warn!(%recipient, error = %e, "staff summary send failed");
                activity::record(
                    db,
                    "summary.failed",
                    &format!("to {recipient}: {e}"),
                    None,
                )
                .await?;
            }
        }
    }

    Ok(())
}
