// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification CRUD and state-transition operations.
//!
//! Every transition is a single UPDATE scoped by primary key; there is no
//! multi-statement lock discipline. The idempotent insert relies on the
//! UNIQUE constraint on external_id.

use chrono::NaiveDate;
use dropline_core::{ConversationState, DroplineError};
use rusqlite::params;

use crate::database::Database;
use crate::models::{
    NOTIFICATION_COLUMNS, NewNotification, Notification, SummaryCounts, notification_from_row,
};

/// Insert a new notification with status `pending`.
///
/// Returns `Some(id)` on insert, or `None` when `external_id` is already
/// present: a duplicate ingestion event is a no-op, not an error.
pub async fn insert(db: &Database, new: &NewNotification) -> Result<Option<i64>, DroplineError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO notifications
                     (external_id, customer_name, phone, store, address, delivery_date,
                      time_window, raw_time, product, driver, rescheduled_from)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(external_id) DO NOTHING",
                params![
                    new.external_id,
                    new.customer_name,
                    new.phone,
                    new.store,
                    new.address,
                    new.delivery_date.format("%Y-%m-%d").to_string(),
                    new.time_window,
                    new.raw_time,
                    new.product,
                    new.driver,
                    new.rescheduled_from,
                ],
            )?;
            if inserted == 0 {
                Ok(None)
            } else {
                Ok(Some(conn.last_insert_rowid()))
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a notification by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<Notification>, DroplineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], notification_from_row);
            match result {
                Ok(n) => Ok(Some(n)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All pending notifications scheduled for the given delivery date,
/// oldest first so batch order is stable.
pub async fn pending_for_date(
    db: &Database,
    date: NaiveDate,
) -> Result<Vec<Notification>, DroplineError> {
    let date = date.format("%Y-%m-%d").to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE status = 'pending' AND delivery_date = ?1
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![date], notification_from_row)?;
            let mut notifications = Vec::new();
            for row in rows {
                notifications.push(row?);
            }
            Ok(notifications)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The single notification eligible to receive classified replies from
/// this phone: the most recently sent row with status `sent`, broken by
/// id for rows sharing a sent_at timestamp.
pub async fn latest_sent_for_phone(
    db: &Database,
    phone: &str,
) -> Result<Option<Notification>, DroplineError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE phone = ?1 AND status = 'sent'
                 ORDER BY sent_at DESC, id DESC
                 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![phone], notification_from_row);
            match result {
                Ok(n) => Ok(Some(n)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The notification holding an active rescheduling conversation with this
/// phone, if any.
pub async fn rescheduling_for_phone(
    db: &Database,
    phone: &str,
) -> Result<Option<Notification>, DroplineError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE phone = ?1 AND conversation_state = 'rescheduling'
                 ORDER BY updated_at DESC, id DESC
                 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![phone], notification_from_row);
            match result {
                Ok(n) => Ok(Some(n)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition pending -> sent, recording the provider message id.
pub async fn mark_sent(
    db: &Database,
    id: i64,
    provider_message_id: &str,
) -> Result<(), DroplineError> {
    let provider_message_id = provider_message_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET status = 'sent', provider_message_id = ?1, error = NULL,
                     sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![provider_message_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition pending -> failed, recording the error and bumping retry_count.
pub async fn mark_failed(db: &Database, id: i64, error: &str) -> Result<(), DroplineError> {
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET status = 'failed', error = ?1, retry_count = retry_count + 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![error, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Re-arm a failed or sent notification for a manual resend.
pub async fn mark_pending(db: &Database, id: i64) -> Result<(), DroplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET status = 'pending', error = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a YES reply: customer_response=yes and status=delivered in one
/// atomic statement.
pub async fn record_confirmation(db: &Database, id: i64) -> Result<(), DroplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET customer_response = 'yes', status = 'delivered',
                     responded_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a NO reply; the rescheduling dialogue is started separately.
pub async fn record_decline(db: &Database, id: i64) -> Result<(), DroplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET customer_response = 'no',
                     responded_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a STOP reply: customer_response=stop and any active conversation
/// reset in one atomic statement.
pub async fn record_opt_out(db: &Database, id: i64) -> Result<(), DroplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET customer_response = 'stop', conversation_state = 'none',
                     responded_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the conversation state of a notification.
pub async fn set_conversation_state(
    db: &Database,
    id: i64,
    state: ConversationState,
) -> Result<(), DroplineError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET conversation_state = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![state, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Close out a conversation after a validated date: conversation_state
/// becomes `rescheduled` and the reschedule counter advances.
pub async fn mark_rescheduled(db: &Database, id: i64) -> Result<(), DroplineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications
                 SET conversation_state = 'rescheduled',
                     reschedule_count = reschedule_count + 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate reply/status counts for one delivery date, excluding
/// administratively cancelled rows.
pub async fn counts_for_date(
    db: &Database,
    date: NaiveDate,
) -> Result<SummaryCounts, DroplineError> {
    let date = date.format("%Y-%m-%d").to_string();
    db.connection()
        .call(move |conn| {
            let counts = conn.query_row(
                "SELECT COUNT(*),
                        IFNULL(SUM(CASE WHEN customer_response = 'yes' THEN 1 ELSE 0 END), 0),
                        IFNULL(SUM(CASE WHEN customer_response = 'no' THEN 1 ELSE 0 END), 0),
                        IFNULL(SUM(CASE WHEN status = 'sent' AND customer_response IS NULL
                                        THEN 1 ELSE 0 END), 0),
                        IFNULL(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                        IFNULL(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                        IFNULL(SUM(CASE WHEN conversation_state = 'rescheduling'
                                        THEN 1 ELSE 0 END), 0)
                 FROM notifications
                 WHERE delivery_date = ?1 AND status != 'cancelled'",
                params![date],
                |row| {
                    Ok(SummaryCounts {
                        total: row.get(0)?,
                        confirmed: row.get(1)?,
                        declined: row.get(2)?,
                        no_reply: row.get(3)?,
                        pending: row.get(4)?,
                        failed: row.get(5)?,
                        rescheduling: row.get(6)?,
                    })
                },
            )?;
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropline_core::{CustomerResponse, NotificationStatus};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_new(external_id: Option<&str>, phone: &str) -> NewNotification {
        NewNotification {
            external_id: external_id.map(String::from),
            customer_name: "Jordan Avery".into(),
            phone: phone.into(),
            store: "riverside".into(),
            address: "12 Elm St".into(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 13).unwrap(),
            time_window: "between 9:00 and 11:00 AM".into(),
            raw_time: Some("9:00 AM".into()),
            product: Some("sectional sofa".into()),
            driver: Some("Sam".into()),
            rescheduled_from: None,
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trips() {
        let (db, _dir) = setup_db().await;
        let id = insert(&db, &make_new(Some("stop-1"), "+15551230001"))
            .await
            .unwrap()
            .expect("fresh insert returns id");

        let n = get(&db, id).await.unwrap().unwrap();
        assert_eq!(n.external_id.as_deref(), Some("stop-1"));
        assert_eq!(n.status, NotificationStatus::Pending);
        assert_eq!(n.conversation_state, dropline_core::ConversationState::None);
        assert_eq!(n.delivery_date, NaiveDate::from_ymd_opt(2026, 8, 13).unwrap());
        assert!(n.customer_response.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_external_id_is_a_noop() {
        let (db, _dir) = setup_db().await;
        let first = insert(&db, &make_new(Some("stop-dup"), "+15551230002"))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = insert(&db, &make_new(Some("stop-dup"), "+15551230002"))
            .await
            .unwrap();
        assert!(second.is_none(), "repeat external_id must be a no-op");

        let pending = pending_for_date(&db, NaiveDate::from_ymd_opt(2026, 8, 13).unwrap())
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn rows_without_external_id_are_never_deduped() {
        let (db, _dir) = setup_db().await;
        // Rescheduled rows carry no external id; two must coexist.
        assert!(insert(&db, &make_new(None, "+15551230003")).await.unwrap().is_some());
        assert!(insert(&db, &make_new(None, "+15551230003")).await.unwrap().is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn latest_sent_selection_is_deterministic() {
        let (db, _dir) = setup_db().await;
        let phone = "+15551230004";
        let a = insert(&db, &make_new(Some("a"), phone)).await.unwrap().unwrap();
        let b = insert(&db, &make_new(Some("b"), phone)).await.unwrap().unwrap();

        mark_sent(&db, a, "SM-a").await.unwrap();
        mark_sent(&db, b, "SM-b").await.unwrap();

        // Same-millisecond sent_at is possible; the id tiebreak keeps the
        // selection deterministic and favors the later row.
        let selected = latest_sent_for_phone(&db, phone).await.unwrap().unwrap();
        assert_eq!(selected.id, b);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delivered_rows_are_not_reply_eligible() {
        let (db, _dir) = setup_db().await;
        let phone = "+15551230005";
        let id = insert(&db, &make_new(Some("c"), phone)).await.unwrap().unwrap();
        mark_sent(&db, id, "SM-c").await.unwrap();
        record_confirmation(&db, id).await.unwrap();

        assert!(latest_sent_for_phone(&db, phone).await.unwrap().is_none());

        let n = get(&db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
        assert_eq!(n.customer_response, Some(CustomerResponse::Yes));
        assert!(n.responded_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_failed_increments_retry_count() {
        let (db, _dir) = setup_db().await;
        let id = insert(&db, &make_new(Some("d"), "+15551230006"))
            .await
            .unwrap()
            .unwrap();

        mark_failed(&db, id, "gateway 500").await.unwrap();
        let n = get(&db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Failed);
        assert_eq!(n.retry_count, 1);
        assert_eq!(n.error.as_deref(), Some("gateway 500"));

        // A resend re-arms and clears the error.
        mark_pending(&db, id).await.unwrap();
        mark_failed(&db, id, "gateway 500 again").await.unwrap();
        let n = get(&db, id).await.unwrap().unwrap();
        assert_eq!(n.retry_count, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn opt_out_resets_conversation_state() {
        let (db, _dir) = setup_db().await;
        let id = insert(&db, &make_new(Some("e"), "+15551230007"))
            .await
            .unwrap()
            .unwrap();
        mark_sent(&db, id, "SM-e").await.unwrap();
        record_decline(&db, id).await.unwrap();
        set_conversation_state(&db, id, ConversationState::Rescheduling)
            .await
            .unwrap();

        record_opt_out(&db, id).await.unwrap();

        let n = get(&db, id).await.unwrap().unwrap();
        assert_eq!(n.customer_response, Some(CustomerResponse::Stop));
        assert_eq!(n.conversation_state, ConversationState::None);
        assert!(
            rescheduling_for_phone(&db, "+15551230007")
                .await
                .unwrap()
                .is_none()
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counts_for_date_aggregates_all_axes() {
        let (db, _dir) = setup_db().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 13).unwrap();

        let confirmed = insert(&db, &make_new(Some("f1"), "+15551230010"))
            .await
            .unwrap()
            .unwrap();
        mark_sent(&db, confirmed, "SM-1").await.unwrap();
        record_confirmation(&db, confirmed).await.unwrap();

        let declined = insert(&db, &make_new(Some("f2"), "+15551230011"))
            .await
            .unwrap()
            .unwrap();
        mark_sent(&db, declined, "SM-2").await.unwrap();
        record_decline(&db, declined).await.unwrap();
        set_conversation_state(&db, declined, ConversationState::Rescheduling)
            .await
            .unwrap();

        let silent = insert(&db, &make_new(Some("f3"), "+15551230012"))
            .await
            .unwrap()
            .unwrap();
        mark_sent(&db, silent, "SM-3").await.unwrap();

        let _pending = insert(&db, &make_new(Some("f4"), "+15551230013"))
            .await
            .unwrap()
            .unwrap();

        let failed = insert(&db, &make_new(Some("f5"), "+15551230014"))
            .await
            .unwrap()
            .unwrap();
        mark_failed(&db, failed, "unreachable").await.unwrap();

        let counts = counts_for_date(&db, date).await.unwrap();
        assert_eq!(
            counts,
            SummaryCounts {
                total: 5,
                confirmed: 1,
                declined: 1,
                no_reply: 1,
                pending: 1,
                failed: 1,
                rescheduling: 1,
            }
        );

        db.close().await.unwrap();
    }
}
