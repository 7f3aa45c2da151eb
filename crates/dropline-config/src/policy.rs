// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled delivery-day policies.
//!
//! [`DeliveryPolicies`] is the runtime form of [`crate::model::DeliveryConfig`]:
//! weekday names parsed, blackout dates indexed, store classification keys
//! lowercased for matching. Built once at startup and shared by ingestion,
//! the reschedule engine, and date validation.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use dropline_core::DroplineError;

use crate::model::DeliveryConfig;

/// Store tag used when a stop's classification key resolves to nothing.
pub const UNKNOWN_STORE: &str = "unknown";

/// Parsed delivery-day policy for one store.
#[derive(Debug, Clone)]
pub struct StoreDayPolicy {
    pub name: String,
    /// Base delivery weekdays; gate both ingestion and reschedules.
    pub base_days: Vec<Weekday>,
    /// Extra weekdays accepted for reschedules only.
    pub flexible_days: Vec<Weekday>,
    /// Documented exceptions, passed verbatim to the extraction oracle.
    pub notes: Option<String>,
}

impl StoreDayPolicy {
    /// All weekdays a reschedule may land on: base ∪ flexible.
    pub fn reschedule_days(&self) -> Vec<Weekday> {
        let mut days = self.base_days.clone();
        for d in &self.flexible_days {
            if !days.contains(d) {
                days.push(*d);
            }
        }
        days
    }
}

/// All delivery-day policies, compiled from configuration.
#[derive(Debug, Clone)]
pub struct DeliveryPolicies {
    min_lead_days: u32,
    blackout_dates: HashSet<NaiveDate>,
    default_days: Vec<Weekday>,
    stores: Vec<(Vec<String>, StoreDayPolicy)>,
}

impl DeliveryPolicies {
    /// Compile the configured policies.
    ///
    /// Fails on unparseable weekday names or blackout dates; run
    /// [`crate::validation::validate_config`] first for collected,
    /// user-friendly errors.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, DroplineError> {
        let default_days = parse_days(&config.default_days, "delivery.default_days")?;

        let mut blackout_dates = HashSet::new();
        for raw in &config.blackout_dates {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                DroplineError::Config(format!("delivery.blackout_dates `{raw}`: {e}"))
            })?;
            blackout_dates.insert(date);
        }

        let mut stores = Vec::with_capacity(config.stores.len());
        for store in &config.stores {
            let keys = store
                .match_keys
                .iter()
                .map(|k| k.trim().to_lowercase())
                .collect();
            stores.push((
                keys,
                StoreDayPolicy {
                    name: store.name.clone(),
                    base_days: parse_days(&store.days, &format!("stores.{}.days", store.name))?,
                    flexible_days: parse_days(
                        &store.flexible_days,
                        &format!("stores.{}.flexible_days", store.name),
                    )?,
                    notes: store.notes.clone(),
                },
            ));
        }

        Ok(Self {
            min_lead_days: config.min_lead_days,
            blackout_dates,
            default_days,
            stores,
        })
    }

    /// Resolve a stop's classification key to a store tag.
    ///
    /// Matching is a case-insensitive exact comparison against each
    /// store's `match_keys`; the store's own name is also accepted.
    /// Anything unresolved maps to [`UNKNOWN_STORE`].
    pub fn resolve_store(&self, classification: Option<&str>) -> &str {
        let Some(key) = classification.map(|k| k.trim().to_lowercase()) else {
            return UNKNOWN_STORE;
        };
        if key.is_empty() {
            return UNKNOWN_STORE;
        }
        for (keys, policy) in &self.stores {
            if keys.iter().any(|k| *k == key) || policy.name.to_lowercase() == key {
                return &policy.name;
            }
        }
        UNKNOWN_STORE
    }

    /// The day policy for a store, if one is configured.
    pub fn store_policy(&self, store: &str) -> Option<&StoreDayPolicy> {
        self.stores.iter().map(|(_, p)| p).find(|p| p.name == store)
    }

    /// Weekdays on which ingestion accepts deliveries for this store:
    /// the store's base days, or the global default when unconfigured.
    pub fn ingest_days(&self, store: &str) -> &[Weekday] {
        self.store_policy(store)
            .map(|p| p.base_days.as_slice())
            .filter(|days| !days.is_empty())
            .unwrap_or(&self.default_days)
    }

    /// Whether a delivery date is acceptable at ingestion time.
    pub fn is_valid_delivery_day(&self, store: &str, date: NaiveDate) -> bool {
        self.ingest_days(store).contains(&date.weekday()) && !self.is_blackout(date)
    }

    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }

    pub fn min_lead_days(&self) -> u32 {
        self.min_lead_days
    }
}

fn parse_days(raw: &[String], context: &str) -> Result<Vec<Weekday>, DroplineError> {
    raw.iter()
        .map(|d| {
            d.parse::<Weekday>()
                .map_err(|_| DroplineError::Config(format!("{context}: `{d}` is not a weekday")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreConfig;

    fn config_with_store() -> DeliveryConfig {
        DeliveryConfig {
            min_lead_days: 2,
            blackout_dates: vec!["2026-12-25".into()],
            default_days: vec!["mon".into(), "wed".into(), "fri".into()],
            stores: vec![StoreConfig {
                name: "riverside".into(),
                match_keys: vec!["RIV".into(), "Riverside North".into()],
                days: vec!["tue".into(), "thu".into()],
                flexible_days: vec!["sat".into()],
                notes: Some("closed the first Tuesday of the month".into()),
            }],
        }
    }

    #[test]
    fn resolves_store_case_insensitively() {
        let policies = DeliveryPolicies::from_config(&config_with_store()).unwrap();
        assert_eq!(policies.resolve_store(Some("riv")), "riverside");
        assert_eq!(policies.resolve_store(Some("RIVERSIDE NORTH")), "riverside");
        assert_eq!(policies.resolve_store(Some("riverside")), "riverside");
        assert_eq!(policies.resolve_store(Some("downtown")), UNKNOWN_STORE);
        assert_eq!(policies.resolve_store(None), UNKNOWN_STORE);
    }

    #[test]
    fn ingest_days_fall_back_to_default() {
        let policies = DeliveryPolicies::from_config(&config_with_store()).unwrap();
        assert_eq!(
            policies.ingest_days("riverside"),
            &[Weekday::Tue, Weekday::Thu]
        );
        assert_eq!(
            policies.ingest_days(UNKNOWN_STORE),
            &[Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
    }

    #[test]
    fn valid_day_check_honors_blackouts() {
        let policies = DeliveryPolicies::from_config(&config_with_store()).unwrap();
        // 2026-12-24 is a Thursday, 2026-12-25 a Friday (blackout).
        let thursday = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
        let friday = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        assert!(policies.is_valid_delivery_day("riverside", thursday));
        assert!(!policies.is_valid_delivery_day("unknown", friday));
        // Friday is a default day, but blacked out.
        assert!(policies.is_blackout(friday));
    }

    #[test]
    fn reschedule_days_union_base_and_flexible() {
        let policies = DeliveryPolicies::from_config(&config_with_store()).unwrap();
        let policy = policies.store_policy("riverside").unwrap();
        assert_eq!(
            policy.reschedule_days(),
            vec![Weekday::Tue, Weekday::Thu, Weekday::Sat]
        );
    }

    #[test]
    fn bad_weekday_is_a_config_error() {
        let mut config = config_with_store();
        config.default_days = vec!["funday".into()];
        assert!(DeliveryPolicies::from_config(&config).is_err());
    }
}
