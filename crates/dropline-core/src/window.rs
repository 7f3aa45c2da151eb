// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery window computation.
//!
//! Converts a raw delivery time (minutes from midnight or a parseable
//! time string) into the canonical customer-facing 2-hour window. The
//! start is rounded up to the next 30-minute mark and clamped to
//! [7:00 AM, 6:00 PM]; the end is always exactly two hours later and is
//! never clamped, so the latest possible window is 6:00–8:00 PM.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Fallback start when the raw time cannot be parsed: 9:00 AM.
pub const FALLBACK_MINUTES: u16 = 540;

/// Earliest permitted window start: 7:00 AM.
const EARLIEST_START: u16 = 420;

/// Latest permitted window start: 6:00 PM.
const LATEST_START: u16 = 1080;

/// Window length in minutes.
const WINDOW_MINUTES: u16 = 120;

/// A canonical 2-hour delivery window, both bounds in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    pub start: u16,
    pub end: u16,
}

impl DeliveryWindow {
    /// Compute the window for a start time in minutes from midnight.
    pub fn from_minutes(minutes: u16) -> Self {
        let rounded = minutes.div_ceil(30) * 30;
        let start = rounded.clamp(EARLIEST_START, LATEST_START);
        Self {
            start,
            end: start + WINDOW_MINUTES,
        }
    }

    /// Compute the window for a raw time string, falling back to 9:00 AM
    /// when the string is unparseable. The fallback is deliberate: a stop
    /// with a garbled time still gets a plausible morning window rather
    /// than being dropped.
    pub fn from_raw(raw: &str) -> Self {
        Self::from_minutes(parse_minutes(raw).unwrap_or(FALLBACK_MINUTES))
    }
}

impl fmt::Display for DeliveryWindow {
    /// Render as `between 9:00 and 11:00 AM`, spelling both meridiems
    /// only when they differ: `between 11:00 AM and 1:00 PM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start_clock, start_mer) = clock_parts(self.start);
        let (end_clock, end_mer) = clock_parts(self.end);
        if start_mer == end_mer {
            write!(f, "between {start_clock} and {end_clock} {end_mer}")
        } else {
            write!(
                f,
                "between {start_clock} {start_mer} and {end_clock} {end_mer}"
            )
        }
    }
}

/// Split minutes-from-midnight into a 12-hour clock string and meridiem.
fn clock_parts(minutes: u16) -> (String, &'static str) {
    let hour24 = (minutes / 60) % 24;
    let minute = minutes % 60;
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour24 < 12 { "AM" } else { "PM" };
    (format!("{hour12}:{minute:02}"), meridiem)
}

/// Parse a raw time string into minutes from midnight.
///
/// Accepted forms, tried in order: `H:MM AM/PM`, 24-hour `HH:MM[:SS]`,
/// and a full timestamp (RFC 3339 or `YYYY-MM-DD HH:MM[:SS]`), from
/// which the local hour and minute are taken as written.
pub fn parse_minutes(raw: &str) -> Option<u16> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    static TWELVE_HOUR: OnceLock<Regex> = OnceLock::new();
    let twelve = TWELVE_HOUR.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})\s*([AaPp])\.?[Mm]\.?$").expect("static regex")
    });
    if let Some(caps) = twelve.captures(trimmed) {
        let hour: u16 = caps[1].parse().ok()?;
        let minute: u16 = caps[2].parse().ok()?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let hour24 = match (&caps[3].to_ascii_lowercase()[..], hour) {
            ("a", 12) => 0,
            ("a", h) => h,
            ("p", 12) => 12,
            ("p", h) => h + 12,
            _ => return None,
        };
        return Some(hour24 * 60 + minute);
    }

    static TWENTY_FOUR_HOUR: OnceLock<Regex> = OnceLock::new();
    let twenty_four = TWENTY_FOUR_HOUR
        .get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::\d{2})?$").expect("static regex"));
    if let Some(caps) = twenty_four.captures(trimmed) {
        let hour: u16 = caps[1].parse().ok()?;
        let minute: u16 = caps[2].parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        return Some(hour * 60 + minute);
    }

    // Full timestamp: take the wall-clock hour/minute as written.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        let t = dt.naive_local().time();
        return Some(time_to_minutes(t));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(time_to_minutes(dt.time()));
        }
    }

    None
}

fn time_to_minutes(t: chrono::NaiveTime) -> u16 {
    use chrono::Timelike;
    (t.hour() * 60 + t.minute()) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_up_to_next_half_hour() {
        // 7:14 rounds to 7:30.
        let w = DeliveryWindow::from_minutes(7 * 60 + 14);
        assert_eq!(w.start, 450);
        assert_eq!(w.end, 570);
    }

    #[test]
    fn on_mark_times_are_unchanged() {
        let w = DeliveryWindow::from_minutes(540);
        assert_eq!(w.start, 540);
        assert_eq!(w.to_string(), "between 9:00 and 11:00 AM");
    }

    #[test]
    fn afternoon_rounding() {
        // 2:15 PM -> 2:30-4:30 PM.
        let w = DeliveryWindow::from_raw("2:15 PM");
        assert_eq!(w.start, 870);
        assert_eq!(w.to_string(), "between 2:30 and 4:30 PM");
    }

    #[test]
    fn late_times_clamp_to_six_pm_start() {
        for raw in ["6:01 PM", "7:45 PM", "23:59"] {
            let w = DeliveryWindow::from_raw(raw);
            assert_eq!(w.start, 1080, "raw: {raw}");
            assert_eq!(w.to_string(), "between 6:00 and 8:00 PM");
        }
    }

    #[test]
    fn early_times_clamp_to_seven_am_start() {
        let w = DeliveryWindow::from_raw("5:00 AM");
        assert_eq!(w.start, 420);
        assert_eq!(w.to_string(), "between 7:00 and 9:00 AM");
    }

    #[test]
    fn unparseable_defaults_to_nine_am() {
        for raw in ["", "whenever", "noonish", "25:99"] {
            let w = DeliveryWindow::from_raw(raw);
            assert_eq!(w.to_string(), "between 9:00 and 11:00 AM", "raw: {raw}");
        }
    }

    #[test]
    fn nine_fourteen_am_scenario() {
        let w = DeliveryWindow::from_raw("9:14 AM");
        assert_eq!(w.to_string(), "between 9:30 and 11:30 AM");
    }

    #[test]
    fn meridiem_spelled_twice_when_spanning_noon() {
        let w = DeliveryWindow::from_raw("11:00 AM");
        assert_eq!(w.to_string(), "between 11:00 AM and 1:00 PM");
    }

    #[test]
    fn parses_24_hour_and_timestamp_forms() {
        assert_eq!(parse_minutes("14:15"), Some(855));
        assert_eq!(parse_minutes("08:05:30"), Some(485));
        assert_eq!(parse_minutes("2026-03-14T14:15:00-05:00"), Some(855));
        assert_eq!(parse_minutes("2026-03-14 09:14"), Some(554));
    }

    #[test]
    fn parses_twelve_hour_variants() {
        assert_eq!(parse_minutes("9:14 AM"), Some(554));
        assert_eq!(parse_minutes("9:14am"), Some(554));
        assert_eq!(parse_minutes("12:00 PM"), Some(720));
        assert_eq!(parse_minutes("12:30 AM"), Some(30));
    }

    proptest! {
        #[test]
        fn window_start_always_within_service_hours(minutes in 0u16..1440) {
            let w = DeliveryWindow::from_minutes(minutes);
            prop_assert!(w.start >= 420, "start {} before 7:00 AM", w.start);
            prop_assert!(w.start <= 1080, "start {} after 6:00 PM", w.start);
            prop_assert_eq!(w.end, w.start + 120);
            prop_assert_eq!(w.start % 30, 0);
        }
    }
}
