// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn operations. Turns are append-only.

use dropline_core::{DroplineError, TurnRole};
use rusqlite::params;
use std::str::FromStr;

use crate::database::Database;
use crate::models::ConversationTurn;

/// Append a turn to a notification's conversation. Returns the turn id.
pub async fn append_turn(
    db: &Database,
    notification_id: i64,
    role: TurnRole,
    content: &str,
) -> Result<i64, DroplineError> {
    let role = role.to_string();
    let content = content.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_turns (notification_id, role, content)
                 VALUES (?1, ?2, ?3)",
                params![notification_id, role, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All turns for a notification in insertion order.
///
/// The full history is replayed to the extraction oracle on every turn, so
/// ordering must match insertion exactly.
pub async fn turns_for(
    db: &Database,
    notification_id: i64,
) -> Result<Vec<ConversationTurn>, DroplineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, notification_id, role, content, created_at
                 FROM conversation_turns
                 WHERE notification_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![notification_id], |row| {
                let role_raw: String = row.get(2)?;
                let role = TurnRole::from_str(&role_raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        e.to_string().into(),
                    )
                })?;
                Ok(ConversationTurn {
                    id: row.get(0)?,
                    notification_id: row.get(1)?,
                    role,
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut turns = Vec::new();
            for row in rows {
                turns.push(row?);
            }
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
