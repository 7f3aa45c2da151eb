// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff summary rendering behind the [`SummaryWriter`] seam.
//!
//! The scheduler hands a deterministic stats line to the writer; the
//! Anthropic implementation reshapes it into a short natural-language
//! digest. `Ok(None)` means "no content" and callers fall back to the
//! deterministic template, so an unavailable writer never blocks the
//! staff batch.

use async_trait::async_trait;
use chrono::NaiveDate;
use dropline_core::DroplineError;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Optional natural-language rendering for the daily staff digest.
#[async_trait]
pub trait SummaryWriter: Send + Sync {
    /// Render a digest for `date` from the deterministic `stats` line.
    /// Returning `Ok(None)` tells the caller to use its fallback template.
    async fn summarize(
        &self,
        date: NaiveDate,
        stats: &str,
    ) -> Result<Option<String>, DroplineError>;
}

/// [`SummaryWriter`] backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicSummaryWriter {
    client: AnthropicClient,
}

impl AnthropicSummaryWriter {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SummaryWriter for AnthropicSummaryWriter {
    async fn summarize(
        &self,
        date: NaiveDate,
        stats: &str,
    ) -> Result<Option<String>, DroplineError> {
        let request = MessageRequest {
            model: self.client.model().to_string(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: format!(
                    "Delivery stats for {date}: {stats}. Write a single short SMS \
                     (under 300 characters) summarizing tomorrow's deliveries for \
                     warehouse staff. Plain text only, no markdown."
                ),
            }],
            system: None,
            max_tokens: self.client.max_tokens(),
            stream: false,
        };

        let response = self.client.complete_message(&request).await?;
        let text = response.text().trim().to_string();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}
