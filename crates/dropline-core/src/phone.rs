// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization to E.164.
//!
//! Every phone number that crosses a crate boundary (inbound webhook
//! sender, ingested stop, outbound send) is normalized here first so
//! that reply matching is a plain string comparison.

/// Normalize a raw phone number to E.164 (`+<country><number>`).
///
/// Bare 10-digit numbers are assumed NANP and prefixed with `+1`;
/// 11-digit numbers starting with 1 likewise. Numbers already carrying a
/// `+` keep their country code. Returns `None` when fewer than 8 digits
/// survive stripping, which callers treat as "no usable phone".
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let had_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 8 {
        return None;
    }

    if had_plus {
        return Some(format!("+{digits}"));
    }

    match digits.len() {
        10 => Some(format!("+1{digits}")),
        11 if digits.starts_with('1') => Some(format!("+{digits}")),
        _ => Some(format!("+{digits}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_nanp_gets_country_code() {
        assert_eq!(normalize("5551234567").as_deref(), Some("+15551234567"));
    }

    #[test]
    fn formatted_numbers_are_stripped() {
        assert_eq!(
            normalize("(555) 123-4567").as_deref(),
            Some("+15551234567")
        );
        assert_eq!(normalize("1-555-123-4567").as_deref(), Some("+15551234567"));
    }

    #[test]
    fn existing_e164_is_preserved() {
        assert_eq!(normalize("+15551234567").as_deref(), Some("+15551234567"));
        assert_eq!(normalize("+447911123456").as_deref(), Some("+447911123456"));
    }

    #[test]
    fn too_short_is_rejected() {
        assert_eq!(normalize("911"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("not a phone"), None);
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(normalize("  +1 555 123 4567 ").as_deref(), Some("+15551234567"));
    }
}
