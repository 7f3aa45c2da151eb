// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as trigger times within a day, parseable weekday
//! names, and E.164-normalizable staff numbers.

use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};

use crate::diagnostic::ConfigError;
use crate::model::DroplineConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DroplineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate gateway binding
    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }
    if config.gateway.port == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.port must be non-zero".to_string(),
        });
    }

    // Validate trigger times fall within a day
    for (key, hour, minute) in [
        (
            "scheduler.send",
            config.scheduler.send_hour,
            config.scheduler.send_minute,
        ),
        (
            "scheduler.summary",
            config.scheduler.summary_hour,
            config.scheduler.summary_minute,
        ),
    ] {
        if hour > 23 {
            errors.push(ConfigError::Validation {
                message: format!("{key}_hour must be 0-23, got {hour}"),
            });
        }
        if minute > 59 {
            errors.push(ConfigError::Validation {
                message: format!("{key}_minute must be 0-59, got {minute}"),
            });
        }
    }

    // Validate weekday name lists
    check_days(&config.scheduler.weekdays, "scheduler.weekdays", &mut errors);
    check_days(
        &config.delivery.default_days,
        "delivery.default_days",
        &mut errors,
    );
    for store in &config.delivery.stores {
        check_days(
            &store.days,
            &format!("delivery.stores.{}.days", store.name),
            &mut errors,
        );
        check_days(
            &store.flexible_days,
            &format!("delivery.stores.{}.flexible_days", store.name),
            &mut errors,
        );
    }

    if config.scheduler.weekdays.is_empty() {
        errors.push(ConfigError::Validation {
            message: "scheduler.weekdays must not be empty".to_string(),
        });
    }

    // Validate staff numbers normalize to E.164
    for number in &config.scheduler.staff_numbers {
        if dropline_core::phone::normalize(number).is_none() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "scheduler.staff_numbers `{number}` is not a usable phone number"
                ),
            });
        }
    }

    // Validate send delay keeps a batch moving
    if config.scheduler.send_delay_ms > 60_000 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.send_delay_ms must be at most 60000, got {}",
                config.scheduler.send_delay_ms
            ),
        });
    }

    // Validate blackout dates parse as calendar dates
    for raw in &config.delivery.blackout_dates {
        if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "delivery.blackout_dates `{raw}` is not a YYYY-MM-DD date"
                ),
            });
        }
    }

    // Validate lead time stays within a plausible horizon
    if config.delivery.min_lead_days > 30 {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.min_lead_days must be at most 30, got {}",
                config.delivery.min_lead_days
            ),
        });
    }

    // Validate store policies: non-empty unique names
    let mut seen_names = HashSet::new();
    for (i, store) in config.delivery.stores.iter().enumerate() {
        if store.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("delivery.stores[{i}].name must not be empty"),
            });
        } else if !seen_names.insert(store.name.to_lowercase()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate store name `{}` in [[delivery.stores]] array",
                    store.name
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_days(days: &[String], key: &str, errors: &mut Vec<ConfigError>) {
    for day in days {
        if day.parse::<Weekday>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{day}` is not a weekday name"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&DroplineConfig::default()).is_ok());
    }

    #[test]
    fn bad_trigger_time_is_collected() {
        let mut config = DroplineConfig::default();
        config.scheduler.send_hour = 24;
        config.scheduler.summary_minute = 61;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bad_weekday_and_blackout_collected_together() {
        let mut config = DroplineConfig::default();
        config.delivery.default_days = vec!["funday".into()];
        config.delivery.blackout_dates = vec!["25-12-2026".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unusable_staff_number_is_rejected() {
        let mut config = DroplineConfig::default();
        config.scheduler.staff_numbers = vec!["911".into()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn duplicate_store_names_are_rejected() {
        let mut config = DroplineConfig::default();
        config.delivery.stores = vec![
            StoreConfig {
                name: "riverside".into(),
                ..Default::default()
            },
            StoreConfig {
                name: "Riverside".into(),
                ..Default::default()
            },
        ];
        assert!(validate_config(&config).is_err());
    }
}
