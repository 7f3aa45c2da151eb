// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS client for the Dropline delivery notifier.
//!
//! Implements [`SmsSender`] over the Twilio Messages API: form-encoded
//! POST with basic auth, one retry after a 1-second delay on transient
//! errors (429, 500, 503), and typed decoding of Twilio error bodies.
//! Credentials are checked at construction so a batch never discovers a
//! missing token halfway through.

use std::time::Duration;

use async_trait::async_trait;
use dropline_config::model::SmsConfig;
use dropline_core::{DroplineError, HealthStatus, SmsSender};
use serde::Deserialize;
use tracing::{debug, warn};

/// Base URL for the Twilio REST API.
const API_BASE_URL: &str = "https://api.twilio.com";

/// Twilio Messages API client.
#[derive(Debug, Clone)]
pub struct SmsClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    max_retries: u32,
    base_url: String,
}

/// Successful create-message response (fields we consume).
#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

/// Twilio error body.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: String,
}

impl SmsClient {
    /// Create a new client.
    ///
    /// Fails fast with a configuration error when any of account SID,
    /// auth token, or from number is absent.
    pub fn new(config: &SmsConfig) -> Result<Self, DroplineError> {
        let account_sid = require(&config.account_sid, "sms.account_sid")?;
        let auth_token = require(&config.auth_token, "sms.auth_token")?;
        let from_number = require(&config.from_number, "sms.from_number")?;

        let from_number = dropline_core::phone::normalize(&from_number).ok_or_else(|| {
            DroplineError::Config(format!(
                "sms.from_number `{from_number}` is not a usable phone number"
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DroplineError::Sms {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_sid,
            auth_token,
            from_number,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// The configured sending number, E.164.
    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    async fn send_once(&self, to: &str, body: &str) -> Result<reqwest::Response, DroplineError> {
        self.client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| DroplineError::Sms {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

fn require(value: &Option<String>, key: &str) -> Result<String, DroplineError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DroplineError::Config(format!(
            "{key} is required for the SMS gateway"
        ))),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl SmsSender for SmsClient {
    /// Send one SMS. On transient errors, retries once after a 1-second delay.
    ///
    /// Returns the provider message SID on success.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, DroplineError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, to, "retrying SMS send after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self.send_once(to, body).await?;
            let status = response.status();
            debug!(status = %status, attempt, to, "SMS gateway response");

            if status.is_success() {
                let created: MessageCreated =
                    response.json().await.map_err(|e| DroplineError::Sms {
                        message: format!("failed to parse gateway response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(created.sid);
            }

            let body_text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body_text, "transient error, will retry");
                last_error = Some(DroplineError::Sms {
                    message: format!("gateway returned {status}: {body_text}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let message = if let Ok(api_err) = serde_json::from_str::<ApiError>(&body_text) {
                format!(
                    "gateway error {} ({}): {}",
                    status,
                    api_err.code.unwrap_or_default(),
                    api_err.message
                )
            } else {
                format!("gateway returned {status}: {body_text}")
            };
            return Err(DroplineError::Sms {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| DroplineError::Sms {
            message: "SMS send failed after retries".into(),
            source: None,
        }))
    }

    async fn health_check(&self) -> Result<HealthStatus, DroplineError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}.json",
            self.base_url, self.account_sid
        );
        let response = self
            .client
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await;
        match response {
            Ok(r) if r.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(r) => Ok(HealthStatus::Unhealthy(format!(
                "gateway returned {}",
                r.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("gateway unreachable: {e}"))),
        }
    }
}
