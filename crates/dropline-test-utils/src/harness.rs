// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage harness: a migrated tempdir-backed database plus seed helpers.

use chrono::NaiveDate;
use dropline_storage::{Database, NewNotification, queries};
use tempfile::TempDir;

/// A fresh migrated database living in a tempdir.
///
/// Hold the harness for the lifetime of the test; dropping it removes the
/// tempdir under the database.
pub struct StorageHarness {
    pub db: Database,
    _dir: TempDir,
}

impl StorageHarness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dropline-test.db");
        let db = Database::open(path.to_str().expect("utf-8 path"))
            .await
            .expect("open test database");
        Self { db, _dir: dir }
    }

    /// Insert a pending notification with sensible defaults.
    pub async fn seed_pending(
        &self,
        external_id: &str,
        phone: &str,
        store: &str,
        date: NaiveDate,
    ) -> i64 {
        queries::notifications::insert(
            &self.db,
            &NewNotification {
                external_id: Some(external_id.to_string()),
                customer_name: "Test Customer".into(),
                phone: phone.to_string(),
                store: store.to_string(),
                address: "42 Test Ave".into(),
                delivery_date: date,
                time_window: "between 9:00 and 11:00 AM".into(),
                raw_time: Some("9:00 AM".into()),
                product: Some("bookshelf".into()),
                driver: Some("Riley".into()),
                rescheduled_from: None,
            },
        )
        .await
        .expect("seed insert")
        .expect("seed insert is not a duplicate")
    }

    /// Insert a notification and mark it sent, making it reply-eligible.
    pub async fn seed_sent(
        &self,
        external_id: &str,
        phone: &str,
        store: &str,
        date: NaiveDate,
    ) -> i64 {
        let id = self.seed_pending(external_id, phone, store, date).await;
        queries::notifications::mark_sent(&self.db, id, &format!("SM-seed-{id}"))
            .await
            .expect("seed mark_sent");
        id
    }
}
