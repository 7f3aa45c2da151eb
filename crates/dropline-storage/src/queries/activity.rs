// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity log operations.
//!
//! Every no-op in the core flows (skipped stop, duplicate ingestion,
//! unrecognized reply) still records an event here, so operators can see
//! what happened without customer-visible errors ever existing.

use dropline_core::DroplineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::ActivityEvent;

/// Record an activity event.
pub async fn record(
    db: &Database,
    event_type: &str,
    detail: &str,
    notification_id: Option<i64>,
) -> Result<(), DroplineError> {
    let event_type = event_type.to_string();
    let detail = detail.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO activity_log (event_type, detail, notification_id)
                 VALUES (?1, ?2, ?3)",
                params![event_type, detail, notification_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent events, newest first.
pub async fn recent(db: &Database, limit: i64) -> Result<Vec<ActivityEvent>, DroplineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, event_type, detail, notification_id, created_at
                 FROM activity_log
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(ActivityEvent {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    detail: row.get(2)?,
                    notification_id: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
