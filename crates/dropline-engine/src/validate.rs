// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side validation of oracle-confirmed dates.
//!
//! The oracle's confirmation is never trusted blindly: every proposed
//! date passes these checks before any state advances. Each rejection
//! carries a specific customer-facing reason and the conversation simply
//! continues.

use chrono::{Datelike, NaiveDate, Weekday};
use dropline_config::DeliveryPolicies;

use crate::messages::{day_list, day_name};

/// Why a proposed date was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRejection {
    /// The date is today or in the past.
    NotFuture,
    /// The date is in the future but inside the minimum lead time.
    TooSoon { min_lead_days: u32 },
    /// The date's weekday is outside the store's allowed set.
    DisallowedWeekday { allowed: Vec<Weekday> },
    /// The date is on the configured blackout list.
    Blackout,
}

impl DateRejection {
    /// The natural-language reply texted back to the customer.
    pub fn customer_message(&self, date: NaiveDate) -> String {
        match self {
            Self::NotFuture => {
                "That date has already come around. Could you pick an upcoming date instead?"
                    .to_string()
            }
            Self::TooSoon { min_lead_days } => format!(
                "We need at least {min_lead_days} days' notice to reroute a delivery. \
                 Could you pick a slightly later date?"
            ),
            Self::DisallowedWeekday { allowed } => format!(
                "We don't deliver to your area on {}s. Delivery days are {}. \
                 Which date works for you?",
                day_name(date.weekday()),
                day_list(allowed),
            ),
            Self::Blackout => format!(
                "We're closed on {}. Could you pick another day?",
                crate::messages::friendly_date(date),
            ),
        }
    }
}

/// Validate an oracle-confirmed date against policy.
///
/// Checks, in order: strictly future, minimum lead time, allowed weekday,
/// blackout list. Returns the first failing check.
pub fn validate_proposed_date(
    proposed: NaiveDate,
    today: NaiveDate,
    allowed_days: &[Weekday],
    policies: &DeliveryPolicies,
) -> Result<(), DateRejection> {
    if proposed <= today {
        return Err(DateRejection::NotFuture);
    }

    let min_lead_days = policies.min_lead_days();
    let lead = (proposed - today).num_days();
    if lead < i64::from(min_lead_days) {
        return Err(DateRejection::TooSoon { min_lead_days });
    }

    if !allowed_days.contains(&proposed.weekday()) {
        return Err(DateRejection::DisallowedWeekday {
            allowed: allowed_days.to_vec(),
        });
    }

    if policies.is_blackout(proposed) {
        return Err(DateRejection::Blackout);
    }

    Ok(())
}
