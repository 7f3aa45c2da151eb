// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound reply classification.
//!
//! Dispatch order:
//! 1. A literal `STOP` always opts out, even mid-rescheduling.
//! 2. An active rescheduling conversation receives the raw text.
//! 3. Otherwise the most recently sent notification for the phone is
//!    classified as YES / NO / unrecognized.
//!
//! Each classification is committed as a single atomic transition before
//! any auto-reply is attempted.

use chrono::{Local, NaiveDate};
use dropline_core::DroplineError;
use dropline_storage::queries::{activity, notifications};
use tracing::{debug, info};

use crate::Engine;
use crate::messages;

impl Engine {
    /// Handle one inbound SMS event from the gateway webhook.
    pub async fn handle_inbound_sms(&self, from: &str, body: &str) -> Result<(), DroplineError> {
        self.handle_inbound_sms_at(from, body, Local::now().date_naive())
            .await
    }

    /// Clock-injected variant of [`Self::handle_inbound_sms`]; `today`
    /// anchors reschedule date validation.
    pub async fn handle_inbound_sms_at(
        &self,
        from: &str,
        body: &str,
        today: NaiveDate,
    ) -> Result<(), DroplineError> {
        let Some(phone) = dropline_core::phone::normalize(from) else {
            debug!(from, "ignoring reply from unusable sender address");
            activity::record(
                &self.db,
                "reply.ignored",
                &format!("unusable sender address `{from}`"),
                None,
            )
            .await?;
            return Ok(());
        };

        let keyword = body.trim().to_uppercase();

        // STOP short-circuits everything, including an active conversation.
        if keyword == "STOP" {
            return self.handle_opt_out(&phone).await;
        }

        // An active rescheduling conversation consumes the raw text.
        if let Some(active) = notifications::rescheduling_for_phone(&self.db, &phone).await? {
            return self.reschedule_turn(&active, body, today).await;
        }

        let Some(target) = notifications::latest_sent_for_phone(&self.db, &phone).await? else {
            info!(%phone, "reply with no matching sent notification");
            activity::record(
                &self.db,
                "reply.no_match",
                &format!("no sent notification for {phone}"),
                None,
            )
            .await?;
            return Ok(());
        };

        match keyword.as_str() {
            "YES" => {
                notifications::record_confirmation(&self.db, target.id).await?;
                activity::record(
                    &self.db,
                    "reply.confirmed",
                    "customer confirmed delivery",
                    Some(target.id),
                )
                .await?;
                info!(notification_id = target.id, "delivery confirmed");
                self.send_best_effort(&phone, &messages::confirmation_reply())
                    .await;
            }
            "NO" => {
                notifications::record_decline(&self.db, target.id).await?;
                activity::record(
                    &self.db,
                    "reply.declined",
                    "customer declined delivery",
                    Some(target.id),
                )
                .await?;
                info!(notification_id = target.id, "delivery declined");
                self.begin_reschedule(&target).await?;
            }
            other => {
                // Includes late texts from already-confirmed customers:
                // logged, never reopened.
                activity::record(
                    &self.db,
                    "reply.unrecognized",
                    &format!("body: `{other}`"),
                    Some(target.id),
                )
                .await?;
                debug!(notification_id = target.id, body = other, "unrecognized reply");
            }
        }

        Ok(())
    }

    /// Opt the sender out, resetting any active conversation.
    async fn handle_opt_out(&self, phone: &str) -> Result<(), DroplineError> {
        let target = match notifications::rescheduling_for_phone(&self.db, phone).await? {
            Some(n) => Some(n),
            None => notifications::latest_sent_for_phone(&self.db, phone).await?,
        };

        let Some(target) = target else {
            activity::record(
                &self.db,
                "reply.no_match",
                &format!("STOP with no sent notification for {phone}"),
                None,
            )
            .await?;
            return Ok(());
        };

        notifications::record_opt_out(&self.db, target.id).await?;
        activity::record(
            &self.db,
            "reply.opt_out",
            "customer opted out",
            Some(target.id),
        )
        .await?;
        info!(notification_id = target.id, "customer opted out");
        self.send_best_effort(phone, &messages::opt_out_reply())
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use dropline_config::{DeliveryPolicies, model::DeliveryConfig, model::StoreConfig};
    use dropline_core::{ConversationState, CustomerResponse, NotificationStatus};
    use dropline_storage::queries::{activity, notifications};
    use dropline_test_utils::{FakeOracle, MockSms, StorageHarness};

    use crate::Engine;

    const PHONE: &str = "+15551239876";

    fn policies() -> DeliveryPolicies {
        DeliveryPolicies::from_config(&DeliveryConfig {
            min_lead_days: 2,
            blackout_dates: vec![],
            default_days: vec!["mon".into(), "wed".into(), "fri".into()],
            stores: vec![StoreConfig {
                name: "riverside".into(),
                match_keys: vec!["riv".into()],
                days: vec!["tue".into(), "thu".into()],
                flexible_days: vec!["sat".into()],
                notes: None,
            }],
        })
        .unwrap()
    }

    async fn engine_with(
        harness: &StorageHarness,
    ) -> (Engine, Arc<MockSms>, Arc<FakeOracle>) {
        let sms = Arc::new(MockSms::new());
        let oracle = Arc::new(FakeOracle::new());
        let engine = Engine::new(
            harness.db.clone(),
            sms.clone(),
            oracle.clone(),
            None,
            policies(),
        );
        (engine, sms, oracle)
    }

    fn delivery_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 13).unwrap()
    }

    #[tokio::test]
    async fn yes_marks_delivered_and_replies() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-yes", PHONE, "riverside", delivery_date())
            .await;
        let (engine, sms, _oracle) = engine_with(&harness).await;

        engine.handle_inbound_sms(PHONE, "  yes ").await.unwrap();

        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
        assert_eq!(n.customer_response, Some(CustomerResponse::Yes));

        let bodies = sms.bodies_to(PHONE);
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("confirmed"));
    }

    #[tokio::test]
    async fn no_starts_rescheduling_and_names_days() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-no", PHONE, "riverside", delivery_date())
            .await;
        let (engine, sms, _oracle) = engine_with(&harness).await;

        // Any casing of "no" begins the conversation.
        engine.handle_inbound_sms(PHONE, "No").await.unwrap();

        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.customer_response, Some(CustomerResponse::No));
        assert_eq!(n.conversation_state, ConversationState::Rescheduling);
        // Decline does not change delivery status by itself.
        assert_eq!(n.status, NotificationStatus::Sent);

        let bodies = sms.bodies_to(PHONE);
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("Tuesday, Thursday or Saturday"), "{}", bodies[0]);
    }

    #[tokio::test]
    async fn no_from_unknown_store_hands_off_manually() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-unknown", PHONE, "unknown", delivery_date())
            .await;
        let (engine, sms, _oracle) = engine_with(&harness).await;

        engine.handle_inbound_sms(PHONE, "no").await.unwrap();

        // No day policy for the store: stays fully manual.
        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.conversation_state, ConversationState::None);
        assert_eq!(n.customer_response, Some(CustomerResponse::No));

        let bodies = sms.bodies_to(PHONE);
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("team will follow up"), "{}", bodies[0]);
    }

    #[tokio::test]
    async fn stop_during_rescheduling_short_circuits() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-stop", PHONE, "riverside", delivery_date())
            .await;
        let (engine, _sms, oracle) = engine_with(&harness).await;

        engine.handle_inbound_sms(PHONE, "no").await.unwrap();
        engine.handle_inbound_sms(PHONE, "STOP").await.unwrap();

        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.customer_response, Some(CustomerResponse::Stop));
        assert_eq!(n.conversation_state, ConversationState::None);

        // The STOP never reached the oracle.
        assert!(oracle.requests().is_empty());

        // Further texts are no longer routed to rescheduling either.
        engine.handle_inbound_sms(PHONE, "friday then").await.unwrap();
        assert!(oracle.requests().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_reply_is_logged_noop() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-what", PHONE, "riverside", delivery_date())
            .await;
        let (engine, sms, _oracle) = engine_with(&harness).await;

        engine
            .handle_inbound_sms(PHONE, "maybe, who is this?")
            .await
            .unwrap();

        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Sent);
        assert!(n.customer_response.is_none());
        assert!(sms.sent().is_empty());

        let events = activity::recent(&harness.db, 5).await.unwrap();
        assert_eq!(events[0].event_type, "reply.unrecognized");
    }

    #[tokio::test]
    async fn late_text_after_yes_does_not_reopen_state() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-late", PHONE, "riverside", delivery_date())
            .await;
        let (engine, _sms, _oracle) = engine_with(&harness).await;

        engine.handle_inbound_sms(PHONE, "YES").await.unwrap();
        engine.handle_inbound_sms(PHONE, "no").await.unwrap();

        // The delivered row is no longer reply-eligible; the late "no" is
        // a logged no-op, not a reopened conversation.
        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
        assert_eq!(n.customer_response, Some(CustomerResponse::Yes));
        assert_eq!(n.conversation_state, ConversationState::None);

        let events = activity::recent(&harness.db, 5).await.unwrap();
        assert_eq!(events[0].event_type, "reply.no_match");
    }

    #[tokio::test]
    async fn reply_from_unknown_number_is_ignored() {
        let harness = StorageHarness::new().await;
        let (engine, sms, _oracle) = engine_with(&harness).await;

        engine
            .handle_inbound_sms("+19998887777", "YES")
            .await
            .unwrap();
        assert!(sms.sent().is_empty());

        let events = activity::recent(&harness.db, 5).await.unwrap();
        assert_eq!(events[0].event_type, "reply.no_match");
    }

    #[tokio::test]
    async fn reply_targets_most_recent_sent_notification() {
        let harness = StorageHarness::new().await;
        let older = harness
            .seed_sent("s-old", PHONE, "riverside", delivery_date())
            .await;
        let newer = harness
            .seed_sent("s-new", PHONE, "riverside", delivery_date())
            .await;
        let (engine, _sms, _oracle) = engine_with(&harness).await;

        engine.handle_inbound_sms(PHONE, "yes").await.unwrap();

        let newer_row = notifications::get(&harness.db, newer).await.unwrap().unwrap();
        let older_row = notifications::get(&harness.db, older).await.unwrap().unwrap();
        assert_eq!(newer_row.status, NotificationStatus::Delivered);
        assert_eq!(older_row.status, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn classification_survives_reply_send_failure() {
        let harness = StorageHarness::new().await;
        let id = harness
            .seed_sent("s-fail", PHONE, "riverside", delivery_date())
            .await;
        let (engine, sms, _oracle) = engine_with(&harness).await;
        sms.fail_for(PHONE);

        engine.handle_inbound_sms(PHONE, "YES").await.unwrap();

        // The classification stands even though the auto-reply failed.
        let n = notifications::get(&harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);

        let events = activity::recent(&harness.db, 5).await.unwrap();
        assert!(events.iter().any(|e| e.event_type == "sms.reply_failed"));
    }
}
