// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily trigger state.
//!
//! [`TriggerState`] is an explicit value object: whether a trigger is due
//! is a pure function of (now, state), which makes restart behavior (the
//! eager startup check) testable without a clock. The last-fired guard
//! lives in process memory only and resets on restart by design; the
//! startup check covers a restart after the threshold.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use dropline_core::DroplineError;

/// One daily trigger: a local time-of-day, a weekday set, and the
/// last-fired date guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerState {
    pub hour: u8,
    pub minute: u8,
    pub weekdays: Vec<Weekday>,
    pub last_fired: Option<NaiveDate>,
}

impl TriggerState {
    pub fn new(hour: u8, minute: u8, weekdays: Vec<Weekday>) -> Self {
        Self {
            hour,
            minute,
            weekdays,
            last_fired: None,
        }
    }

    /// Build from configured weekday names.
    pub fn from_names(hour: u8, minute: u8, names: &[String]) -> Result<Self, DroplineError> {
        let weekdays = names
            .iter()
            .map(|d| {
                d.parse::<Weekday>().map_err(|_| {
                    DroplineError::Config(format!("scheduler weekday `{d}` is not a weekday name"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(hour, minute, weekdays))
    }

    /// Whether the trigger should fire at `now`.
    ///
    /// True when `now` is at or past the configured time-of-day on a
    /// valid weekday and the trigger has not already fired for `now`'s
    /// date. Date rollover resets the guard implicitly.
    pub fn due(&self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if self.last_fired == Some(today) {
            return false;
        }
        if !self.weekdays.contains(&today.weekday()) {
            return false;
        }
        let threshold = u32::from(self.hour) * 60 + u32::from(self.minute);
        let current = now.hour() * 60 + now.minute();
        current >= threshold
    }

    /// Record a fire for `date`.
    pub fn mark_fired(&mut self, date: NaiveDate) {
        self.last_fired = Some(date);
    }
}
