// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! Status, response, and conversation state are typed enums in memory and
//! lowercase strings at the SQL boundary; the CHECK constraints in the
//! migrations mirror the enum variants exactly.

use std::str::FromStr;

use chrono::NaiveDate;
use dropline_core::{ConversationState, CustomerResponse, NotificationStatus, TurnRole};

/// One planned delivery SMS and its full lifecycle state.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: i64,
    /// Stable identifier from the route-planning provider, used for dedup.
    pub external_id: Option<String>,
    pub customer_name: String,
    /// E.164.
    pub phone: String,
    pub store: String,
    pub address: String,
    pub delivery_date: NaiveDate,
    /// Canonical window text, or "TBD" for rescheduled rows awaiting routing.
    pub time_window: String,
    pub raw_time: Option<String>,
    pub product: Option<String>,
    pub driver: Option<String>,
    pub status: NotificationStatus,
    pub customer_response: Option<CustomerResponse>,
    pub conversation_state: ConversationState,
    pub retry_count: i64,
    pub reschedule_count: i64,
    pub error: Option<String>,
    pub provider_message_id: Option<String>,
    pub rescheduled_from: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub sent_at: Option<String>,
    pub responded_at: Option<String>,
}

/// Fields required to insert a new notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub external_id: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub store: String,
    pub address: String,
    pub delivery_date: NaiveDate,
    pub time_window: String,
    pub raw_time: Option<String>,
    pub product: Option<String>,
    pub driver: Option<String>,
    pub rescheduled_from: Option<i64>,
}

/// One turn of a rescheduling conversation.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub id: i64,
    pub notification_id: i64,
    pub role: TurnRole,
    pub content: String,
    pub created_at: String,
}

/// One operator-facing activity event.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub id: i64,
    pub event_type: String,
    pub detail: String,
    pub notification_id: Option<i64>,
    pub created_at: String,
}

/// Aggregated counts for one delivery date, feeding the staff summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    pub total: i64,
    pub confirmed: i64,
    pub declined: i64,
    pub no_reply: i64,
    pub pending: i64,
    pub failed: i64,
    pub rescheduling: i64,
}

/// Column list matching [`notification_from_row`]; keep the two in sync.
pub(crate) const NOTIFICATION_COLUMNS: &str = "id, external_id, customer_name, phone, store, \
     address, delivery_date, time_window, raw_time, product, driver, status, \
     customer_response, conversation_state, retry_count, reschedule_count, error, \
     provider_message_id, rescheduled_from, created_at, updated_at, sent_at, responded_at";

/// Map a row selected with [`NOTIFICATION_COLUMNS`] into a [`Notification`].
pub(crate) fn notification_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        external_id: row.get(1)?,
        customer_name: row.get(2)?,
        phone: row.get(3)?,
        store: row.get(4)?,
        address: row.get(5)?,
        delivery_date: parse_column(row, 6, |s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())
        })?,
        time_window: row.get(7)?,
        raw_time: row.get(8)?,
        product: row.get(9)?,
        driver: row.get(10)?,
        status: parse_column(row, 11, |s| {
            NotificationStatus::from_str(s).map_err(|e| e.to_string())
        })?,
        customer_response: parse_optional_column(row, 12, |s| {
            CustomerResponse::from_str(s).map_err(|e| e.to_string())
        })?,
        conversation_state: parse_column(row, 13, |s| {
            ConversationState::from_str(s).map_err(|e| e.to_string())
        })?,
        retry_count: row.get(14)?,
        reschedule_count: row.get(15)?,
        error: row.get(16)?,
        provider_message_id: row.get(17)?,
        rescheduled_from: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
        sent_at: row.get(21)?,
        responded_at: row.get(22)?,
    })
}

/// Parse a TEXT column through `f`, surfacing failures as conversion errors
/// so a corrupted row is reported rather than silently defaulted.
fn parse_column<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    f: impl Fn(&str) -> Result<T, String>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    f(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("column {idx}: {e}").into(),
        )
    })
}

fn parse_optional_column<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    f: impl Fn(&str) -> Result<T, String>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        f(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                format!("column {idx}: {e}").into(),
            )
        })
    })
    .transpose()
}
