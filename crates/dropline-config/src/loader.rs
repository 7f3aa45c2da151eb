// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dropline.toml` > `~/.config/dropline/dropline.toml` > `/etc/dropline/dropline.toml`
//! with environment variable overrides via `DROPLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DroplineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dropline/dropline.toml` (system-wide)
/// 3. `~/.config/dropline/dropline.toml` (user XDG config)
/// 4. `./dropline.toml` (local directory)
/// 5. `DROPLINE_*` environment variables
pub fn load_config() -> Result<DroplineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<DroplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DroplineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DroplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DroplineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DroplineConfig::default()))
        .merge(Toml::file("/etc/dropline/dropline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dropline/dropline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dropline.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `DROPLINE_SMS_ACCOUNT_SID` must
/// map to `sms.account_sid`, not `sms.account.sid`.
fn env_provider() -> Env {
    Env::prefixed("DROPLINE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DROPLINE_SMS_ACCOUNT_SID -> "sms_account_sid"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("sms_", "sms.", 1)
            .replacen("oracle_", "oracle.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("scheduler_", "scheduler.", 1)
            .replacen("delivery_", "delivery.", 1);
        mapped.into()
    })
}
