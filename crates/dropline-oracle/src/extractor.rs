// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date extraction behind the [`ExtractionOracle`] seam.
//!
//! The reschedule engine only ever sees one of the three
//! [`SchedulingIntent`] variants. The engine's validation logic is fully
//! testable with a fake oracle returning canned intents; the real
//! implementation here turns free-form customer text into an intent via
//! the Messages API and a strict JSON reply contract.

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use dropline_core::{DroplineError, TurnRole};
use serde::Deserialize;
use tracing::debug;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, SchedulingIntent};

/// Everything the oracle needs to interpret one customer turn.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub today: NaiveDate,
    pub original_date: NaiveDate,
    pub address: String,
    pub store_name: String,
    /// Weekdays a reschedule may land on (base ∪ flexible).
    pub allowed_days: Vec<Weekday>,
    /// Documented policy exceptions, passed verbatim.
    pub policy_notes: Option<String>,
    /// Full conversation history, oldest first.
    pub history: Vec<(TurnRole, String)>,
}

/// External natural-language date extraction.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<SchedulingIntent, DroplineError>;
}

/// [`ExtractionOracle`] backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicExtractor {
    client: AnthropicClient,
}

impl AnthropicExtractor {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    fn system_prompt(request: &ExtractionRequest) -> String {
        let days = request
            .allowed_days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let notes = request
            .policy_notes
            .as_deref()
            .map(|n| format!("\nPolicy exceptions: {n}"))
            .unwrap_or_default();

        format!(
            "You are a delivery rescheduling assistant for the {store} store.\n\
             Today's date is {today}. The delivery was originally planned for \
             {original} at {address}.\n\
             Deliveries for this store run only on: {days}.{notes}\n\
             Read the conversation and respond with EXACTLY ONE line of JSON, \
             no prose, in one of these shapes:\n\
             {{\"action\": \"confirm\", \"date\": \"YYYY-MM-DD\"}} when the customer \
             committed to that specific date\n\
             {{\"action\": \"clarify\", \"reply\": \"<question to text the customer>\"}} \
             when you need more information\n\
             {{\"action\": \"handoff\", \"reply\": \"<message to text the customer>\"}} \
             when a human should take over\n\
             Never confirm a date you were not explicitly given or that cannot be \
             resolved to a calendar date.",
            store = request.store_name,
            today = request.today.format("%A, %Y-%m-%d"),
            original = request.original_date.format("%A, %Y-%m-%d"),
            address = request.address,
        )
    }

    fn to_messages(history: &[(TurnRole, String)]) -> Vec<ApiMessage> {
        history
            .iter()
            .map(|(role, content)| ApiMessage {
                role: match role {
                    TurnRole::Assistant => "assistant".to_string(),
                    TurnRole::Customer => "user".to_string(),
                },
                content: content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ExtractionOracle for AnthropicExtractor {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<SchedulingIntent, DroplineError> {
        let api_request = MessageRequest {
            model: self.client.model().to_string(),
            messages: Self::to_messages(&request.history),
            system: Some(Self::system_prompt(request)),
            max_tokens: self.client.max_tokens(),
            stream: false,
        };

        let response = self.client.complete_message(&api_request).await?;
        let text = response.text();
        debug!(reply = %text, "oracle reply received");
        parse_intent(&text)
    }
}

/// JSON shape the oracle must reply with.
#[derive(Debug, Deserialize)]
struct WireIntent {
    action: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    reply: Option<String>,
}

/// Decode the oracle's reply text into a [`SchedulingIntent`].
///
/// Anything that does not decode (prose, an unknown action, a confirm
/// without a resolvable date) is an oracle error. Callers treat that as
/// transient and leave conversation state untouched.
pub fn parse_intent(text: &str) -> Result<SchedulingIntent, DroplineError> {
    // Models occasionally wrap the JSON in a code fence; strip it.
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let wire: WireIntent = serde_json::from_str(cleaned).map_err(|e| DroplineError::Oracle {
        message: format!("unparseable oracle reply: {e}"),
        source: None,
    })?;

    match wire.action.as_str() {
        "confirm" => {
            let raw = wire.date.ok_or_else(|| DroplineError::Oracle {
                message: "confirm intent missing date".into(),
                source: None,
            })?;
            let date =
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| DroplineError::Oracle {
                    message: format!("confirm intent date `{raw}`: {e}"),
                    source: None,
                })?;
            Ok(SchedulingIntent::ConfirmDate { date })
        }
        "clarify" => {
            let reply = non_empty_reply(wire.reply, "clarify")?;
            Ok(SchedulingIntent::Clarify { reply })
        }
        "handoff" => {
            let reply = non_empty_reply(wire.reply, "handoff")?;
            Ok(SchedulingIntent::Handoff { reply })
        }
        other => Err(DroplineError::Oracle {
            message: format!("unknown oracle action `{other}`"),
            source: None,
        }),
    }
}

fn non_empty_reply(reply: Option<String>, action: &str) -> Result<String, DroplineError> {
    match reply {
        Some(r) if !r.trim().is_empty() => Ok(r),
        _ => Err(DroplineError::Oracle {
            message: format!("{action} intent missing reply text"),
            source: None,
        }),
    }
}
