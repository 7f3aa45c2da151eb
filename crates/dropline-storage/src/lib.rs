// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Dropline delivery notifier.
//!
//! All state lives in one SQLite file in WAL mode; every write goes
//! through a single serialized connection. Each state transition is a
//! single atomic UPDATE scoped by primary key.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{
    ActivityEvent, ConversationTurn, NewNotification, Notification, SummaryCounts,
};
