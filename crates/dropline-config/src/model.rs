// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Dropline delivery notifier.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Dropline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DroplineConfig {
    /// Service identity and behavior settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// SMS gateway (Twilio) settings.
    #[serde(default)]
    pub sms: SmsConfig,

    /// Extraction oracle (Anthropic) settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Daily batch trigger settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Delivery-day policy settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Service identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the service.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "dropline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("dropline").join("dropline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("dropline.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// SMS gateway configuration.
///
/// All three credentials are required before any send; absence fails fast
/// at client construction, never mid-batch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    /// Twilio account SID. `None` requires environment variable.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Twilio auth token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Sending phone number in E.164.
    #[serde(default)]
    pub from_number: Option<String>,
}

/// Extraction oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Anthropic API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for date extraction and staff summaries.
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_oracle_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_oracle_model(),
            max_tokens: default_oracle_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_oracle_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_oracle_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Webhook gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for the admin trigger surface. `None` disables admin routes.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Daily batch trigger configuration.
///
/// Both batches address deliveries scheduled for the *following* calendar
/// day, so the trigger times are late-afternoon local time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Local hour for the customer-send batch.
    #[serde(default = "default_send_hour")]
    pub send_hour: u8,

    /// Local minute for the customer-send batch.
    #[serde(default)]
    pub send_minute: u8,

    /// Local hour for the staff-summary batch.
    #[serde(default = "default_summary_hour")]
    pub summary_hour: u8,

    /// Local minute for the staff-summary batch.
    #[serde(default)]
    pub summary_minute: u8,

    /// Weekdays on which the triggers may fire (e.g. "mon".."sat").
    #[serde(default = "default_trigger_days")]
    pub weekdays: Vec<String>,

    /// Staff recipients for the daily summary, E.164.
    #[serde(default)]
    pub staff_numbers: Vec<String>,

    /// Delay between consecutive sends within a batch, in milliseconds.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            send_hour: default_send_hour(),
            send_minute: 0,
            summary_hour: default_summary_hour(),
            summary_minute: 0,
            weekdays: default_trigger_days(),
            staff_numbers: Vec::new(),
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

fn default_send_hour() -> u8 {
    17
}

fn default_summary_hour() -> u8 {
    18
}

fn default_trigger_days() -> Vec<String> {
    ["mon", "tue", "wed", "thu", "fri", "sat"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_send_delay_ms() -> u64 {
    500
}

/// Delivery-day policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Minimum lead time in days for a rescheduled delivery.
    #[serde(default = "default_min_lead_days")]
    pub min_lead_days: u32,

    /// Dates (YYYY-MM-DD) on which no deliveries run.
    #[serde(default)]
    pub blackout_dates: Vec<String>,

    /// Valid delivery weekdays for stores without an explicit policy.
    #[serde(default = "default_delivery_days")]
    pub default_days: Vec<String>,

    /// Per-store delivery-day policies.
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            min_lead_days: default_min_lead_days(),
            blackout_dates: Vec::new(),
            default_days: default_delivery_days(),
            stores: Vec::new(),
        }
    }
}

fn default_min_lead_days() -> u32 {
    2
}

fn default_delivery_days() -> Vec<String> {
    ["mon", "tue", "wed", "thu", "fri", "sat"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Delivery-day policy for one store/region.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store/region tag recorded on notifications.
    pub name: String,

    /// Classification keys on inbound stops that resolve to this store
    /// (compared case-insensitively).
    #[serde(default)]
    pub match_keys: Vec<String>,

    /// Base delivery weekdays for this store.
    #[serde(default)]
    pub days: Vec<String>,

    /// Additional weekdays accepted for reschedules only.
    #[serde(default)]
    pub flexible_days: Vec<String>,

    /// Documented exceptions passed verbatim to the extraction oracle.
    #[serde(default)]
    pub notes: Option<String>,
}
