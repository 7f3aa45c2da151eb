// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer- and staff-facing SMS text builders.
//!
//! Customers only ever see these natural-language messages; raw error
//! text never leaves the activity log.

use chrono::{NaiveDate, Weekday};
use dropline_storage::{Notification, SummaryCounts};

/// Full weekday name for customer-facing text.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Join weekday names naturally: "Tuesday, Thursday or Saturday".
pub fn day_list(days: &[Weekday]) -> String {
    let names: Vec<&str> = days.iter().map(|d| day_name(*d)).collect();
    match names.len() {
        0 => String::new(),
        1 => names[0].to_string(),
        _ => format!(
            "{} or {}",
            names[..names.len() - 1].join(", "),
            names[names.len() - 1]
        ),
    }
}

/// "Friday, August 21".
pub fn friendly_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// The daily delivery notice sent by the customer batch.
pub fn delivery_notice(n: &Notification) -> String {
    let what = n
        .product
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("your {p}"))
        .unwrap_or_else(|| "your order".to_string());

    let when = if n.time_window == "TBD" {
        "we'll follow up with a time window".to_string()
    } else {
        n.time_window.clone()
    };

    format!(
        "Hi {name}, {what} is scheduled for delivery {date}, {when}. \
         Reply YES to confirm, NO to reschedule, or STOP to opt out.",
        name = n.customer_name,
        date = friendly_date(n.delivery_date),
    )
}

/// Auto-reply after a YES.
pub fn confirmation_reply() -> String {
    "Thanks! Your delivery is confirmed, see you then.".to_string()
}

/// Auto-reply after a STOP.
pub fn opt_out_reply() -> String {
    "You've been unsubscribed from delivery updates. Our team will reach you \
     another way if anything changes."
        .to_string()
}

/// Entry message when the store has no delivery-day policy: fully manual.
pub fn manual_followup_reply() -> String {
    "Thanks for letting us know. A member of our team will follow up shortly \
     to arrange a new delivery date."
        .to_string()
}

/// First message of a rescheduling conversation, naming the valid days.
pub fn reschedule_opening(days: &[Weekday]) -> String {
    format!(
        "No problem, we can find a better day. We deliver to your area on \
         {days}. What date works for you?",
        days = day_list(days),
    )
}

/// Sent when the oracle is unavailable or replies unusably.
pub fn trouble_reply() -> String {
    "Sorry, we're having trouble on our end right now. A member of our team \
     will follow up to get this sorted."
        .to_string()
}

/// Sent after a validated reschedule.
pub fn reschedule_confirmed(date: NaiveDate) -> String {
    format!(
        "You're all set: your delivery is rescheduled for {}. We'll text you \
         a time window the day before.",
        friendly_date(date),
    )
}

/// Deterministic stats line handed to the summary writer.
pub fn stats_line(counts: &SummaryCounts) -> String {
    format!(
        "total={} confirmed={} declined={} no_reply={} pending={} failed={} rescheduling={}",
        counts.total,
        counts.confirmed,
        counts.declined,
        counts.no_reply,
        counts.pending,
        counts.failed,
        counts.rescheduling,
    )
}

/// Fallback staff digest used when the summary writer is unavailable or
/// returns no content.
pub fn staff_fallback(date: NaiveDate, counts: &SummaryCounts) -> String {
    format!(
        "Deliveries for {date}: {total} scheduled, {confirmed} confirmed, \
         {declined} declined, {no_reply} awaiting reply, {pending} unsent, \
         {failed} failed, {rescheduling} rescheduling.",
        date = friendly_date(date),
        total = counts.total,
        confirmed = counts.confirmed,
        declined = counts.declined,
        no_reply = counts.no_reply,
        pending = counts.pending,
        failed = counts.failed,
        rescheduling = counts.rescheduling,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_list_reads_naturally() {
        assert_eq!(day_list(&[Weekday::Tue]), "Tuesday");
        assert_eq!(day_list(&[Weekday::Tue, Weekday::Thu]), "Tuesday or Thursday");
        assert_eq!(
            day_list(&[Weekday::Tue, Weekday::Thu, Weekday::Sat]),
            "Tuesday, Thursday or Saturday"
        );
    }

    #[test]
    fn friendly_date_formats_without_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(friendly_date(date), "Friday, August 7");
    }

    #[test]
    fn reschedule_opening_names_the_days() {
        let text = reschedule_opening(&[Weekday::Tue, Weekday::Thu]);
        assert!(text.contains("Tuesday or Thursday"));
        assert!(text.contains("What date works"));
    }

    #[test]
    fn staff_fallback_is_deterministic() {
        let counts = SummaryCounts {
            total: 8,
            confirmed: 5,
            declined: 1,
            no_reply: 1,
            pending: 1,
            failed: 0,
            rescheduling: 1,
        };
        let date = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        assert_eq!(
            staff_fallback(date, &counts),
            "Deliveries for Saturday, August 8: 8 scheduled, 5 confirmed, 1 declined, \
             1 awaiting reply, 1 unsent, 0 failed, 1 rescheduling."
        );
    }
}
