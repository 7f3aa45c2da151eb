// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline test: ingestion -> customer batch -> decline ->
//! rescheduling conversation -> new pending row -> follow-up batch.
//!
//! Everything runs against a tempdir database with the mock SMS sender
//! and the fake oracle; no network, no credentials.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use dropline_config::{
    DeliveryPolicies,
    model::{DeliveryConfig, StoreConfig},
};
use dropline_core::{ConversationState, CustomerResponse, NotificationStatus};
use dropline_engine::Engine;
use dropline_ingest::IngestionGateway;
use dropline_oracle::SchedulingIntent;
use dropline_scheduler::{run_customer_batch, run_staff_summary};
use dropline_storage::queries::notifications;
use dropline_test_utils::{FakeOracle, MockSms, StorageHarness};
use serde_json::json;

const PHONE: &str = "+15551112222";

// Friday; the original delivery lands the following Thursday and the
// reschedule on the Saturday after it.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn original_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 13).unwrap()
}

fn rescheduled_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()
}

fn policies() -> DeliveryPolicies {
    DeliveryPolicies::from_config(&DeliveryConfig {
        min_lead_days: 2,
        blackout_dates: vec![],
        default_days: vec!["mon".into(), "wed".into(), "fri".into()],
        stores: vec![StoreConfig {
            name: "riverside".into(),
            match_keys: vec!["RIV".into()],
            days: vec!["tue".into(), "thu".into()],
            flexible_days: vec!["sat".into()],
            notes: None,
        }],
    })
    .unwrap()
}

#[tokio::test]
async fn full_delivery_lifecycle_with_reschedule() {
    let harness = StorageHarness::new().await;
    let sms = Arc::new(MockSms::new());
    let oracle = Arc::new(FakeOracle::new());

    let ingestion = IngestionGateway::new(harness.db.clone(), policies(), None);
    let engine = Engine::new(
        harness.db.clone(),
        sms.clone(),
        oracle.clone(),
        None,
        policies(),
    );

    // 1. The provider pushes a route; one stop becomes a pending row.
    let report = ingestion
        .ingest(json!({
            "route": {
                "id": "route-42",
                "stops": [{
                    "id": "stop-100",
                    "customer_name": "Jordan Avery",
                    "phone": "(555) 111-2222",
                    "address": "12 Elm St",
                    "scheduled_date": original_date().to_string(),
                    "arrival_time": "9:14 AM",
                    "location_code": "RIV",
                    "items": "sectional sofa"
                }]
            }
        }))
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);

    // 2. The customer batch sends the notice with the canonical window.
    let report = run_customer_batch(&harness.db, sms.as_ref(), original_date(), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    let notice = &sms.bodies_to(PHONE)[0];
    assert!(notice.contains("between 9:30 and 11:30 AM"), "{notice}");
    assert!(notice.contains("Reply YES"), "{notice}");

    let sent = notifications::latest_sent_for_phone(&harness.db, PHONE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sent.status, NotificationStatus::Sent);

    // 3. The customer declines; the conversation opens naming the days.
    engine
        .handle_inbound_sms_at(PHONE, "no", today())
        .await
        .unwrap();
    let declined = notifications::get(&harness.db, sent.id).await.unwrap().unwrap();
    assert_eq!(declined.customer_response, Some(CustomerResponse::No));
    assert_eq!(declined.conversation_state, ConversationState::Rescheduling);
    assert!(sms.bodies_to(PHONE)[1].contains("Tuesday, Thursday or Saturday"));

    // 4. One clarification round trip, then a validated confirmation.
    oracle.push_intent(SchedulingIntent::Clarify {
        reply: "This Saturday or next?".into(),
    });
    engine
        .handle_inbound_sms_at(PHONE, "saturday", today())
        .await
        .unwrap();

    oracle.push_intent(SchedulingIntent::ConfirmDate {
        date: rescheduled_date(),
    });
    engine
        .handle_inbound_sms_at(PHONE, "this saturday, the 15th", today())
        .await
        .unwrap();

    let original = notifications::get(&harness.db, sent.id).await.unwrap().unwrap();
    assert_eq!(original.conversation_state, ConversationState::Rescheduled);
    assert_eq!(original.reschedule_count, 1);

    let replacements = notifications::pending_for_date(&harness.db, rescheduled_date())
        .await
        .unwrap();
    assert_eq!(replacements.len(), 1);
    assert_eq!(replacements[0].rescheduled_from, Some(sent.id));
    assert_eq!(replacements[0].time_window, "TBD");

    // 5. The new row re-enters the pipeline; its notice has no window yet.
    let report = run_customer_batch(&harness.db, sms.as_ref(), rescheduled_date(), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    let followup = sms.bodies_to(PHONE).pop().unwrap();
    assert!(followup.contains("follow up with a time window"), "{followup}");

    // 6. The staff digest for the new date reflects the resent state.
    run_staff_summary(
        &harness.db,
        sms.as_ref(),
        None,
        &["+15559990077".to_string()],
        rescheduled_date(),
    )
    .await
    .unwrap();
    let digest = sms.bodies_to("+15559990077").pop().unwrap();
    assert!(digest.contains("1 scheduled"), "{digest}");
}

#[tokio::test]
async fn confirmation_path_ends_the_lifecycle() {
    let harness = StorageHarness::new().await;
    let sms = Arc::new(MockSms::new());
    let oracle = Arc::new(FakeOracle::new());
    let engine = Engine::new(
        harness.db.clone(),
        sms.clone(),
        oracle.clone(),
        None,
        policies(),
    );

    let id = harness
        .seed_sent("stop-200", PHONE, "riverside", original_date())
        .await;

    engine
        .handle_inbound_sms_at(PHONE, "YES", today())
        .await
        .unwrap();

    let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
    assert_eq!(n.status, NotificationStatus::Delivered);
    assert_eq!(n.customer_response, Some(CustomerResponse::Yes));
    assert_eq!(n.conversation_state, ConversationState::None);
    assert!(oracle.requests().is_empty());
}
