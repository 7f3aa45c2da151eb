// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading, diagnostics, and validation.

use dropline_config::{ConfigError, load_and_validate_str};

#[test]
fn full_config_round_trip() {
    let config = load_and_validate_str(
        r#"
        [app]
        name = "dropline-test"
        log_level = "debug"

        [storage]
        database_path = "/tmp/dropline-test.db"

        [sms]
        account_sid = "AC00000000000000000000000000000000"
        auth_token = "secret"
        from_number = "+15550001111"

        [gateway]
        host = "0.0.0.0"
        port = 9090
        bearer_token = "hunter2"

        [scheduler]
        send_hour = 16
        summary_hour = 17
        summary_minute = 30
        staff_numbers = ["+15559876543"]

        [delivery]
        min_lead_days = 3
        blackout_dates = ["2026-12-25", "2027-01-01"]

        [[delivery.stores]]
        name = "riverside"
        match_keys = ["RIV"]
        days = ["tue", "thu"]
        "#,
    )
    .expect("config should load and validate");

    assert_eq!(config.app.name, "dropline-test");
    assert_eq!(config.gateway.port, 9090);
    assert_eq!(config.scheduler.summary_minute, 30);
    assert_eq!(config.delivery.blackout_dates.len(), 2);
}

#[test]
fn unknown_key_yields_suggestion() {
    let errors = load_and_validate_str(
        r#"
        [scheduler]
        send_huor = 16
        "#,
    )
    .unwrap_err();

    let ConfigError::UnknownKey { key, suggestion, .. } = &errors[0] else {
        panic!("expected UnknownKey, got {:?}", errors[0]);
    };
    assert_eq!(key, "send_huor");
    assert_eq!(suggestion.as_deref(), Some("send_hour"));
}

#[test]
fn validation_errors_are_collected_not_fail_fast() {
    let errors = load_and_validate_str(
        r#"
        [scheduler]
        send_hour = 25
        staff_numbers = ["bogus"]

        [delivery]
        blackout_dates = ["tomorrow"]
        "#,
    )
    .unwrap_err();

    assert!(errors.len() >= 3, "expected all errors collected: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn env_style_empty_config_is_valid() {
    let config = load_and_validate_str("").expect("defaults must validate");
    assert!(config.sms.account_sid.is_none());
    assert!(config.scheduler.staff_numbers.is_empty());
}
