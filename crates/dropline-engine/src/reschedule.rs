// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rescheduling conversation state machine.
//!
//! Per notification: none -> rescheduling -> {rescheduled, handoff}.
//! Every customer turn is appended to the conversation log, the full
//! history replayed to the extraction oracle, and any confirmed date
//! validated server-side before state advances. A validated date closes
//! the conversation and creates a brand-new pending notification
//! referencing the original.

use chrono::NaiveDate;
use dropline_core::{ConversationState, DroplineError, TurnRole, UnassignedStop};
use dropline_oracle::{ExtractionRequest, SchedulingIntent};
use dropline_storage::{
    NewNotification, Notification,
    queries::{activity, conversations, notifications},
};
use tracing::{info, warn};

use crate::Engine;
use crate::messages;
use crate::validate::validate_proposed_date;

impl Engine {
    /// Enter rescheduling after a decline.
    ///
    /// A store without a delivery-day policy goes straight to a manual
    /// follow-up: the customer is told the team will reach out and
    /// conversation state stays `none`.
    pub(crate) async fn begin_reschedule(&self, n: &Notification) -> Result<(), DroplineError> {
        // Terminal conversation states never restart automation.
        if matches!(
            n.conversation_state,
            ConversationState::Handoff | ConversationState::Rescheduled
        ) {
            activity::record(
                &self.db,
                "reschedule.suppressed",
                &format!("decline while in {} state", n.conversation_state),
                Some(n.id),
            )
            .await?;
            return Ok(());
        }

        let days = self
            .policies
            .store_policy(&n.store)
            .map(|p| p.reschedule_days())
            .filter(|days| !days.is_empty());

        let Some(days) = days else {
            activity::record(
                &self.db,
                "reschedule.manual_handoff",
                &format!("no delivery-day policy for store `{}`", n.store),
                Some(n.id),
            )
            .await?;
            info!(notification_id = n.id, store = %n.store, "no day policy, manual follow-up");
            self.send_best_effort(&n.phone, &messages::manual_followup_reply())
                .await;
            return Ok(());
        };

        notifications::set_conversation_state(&self.db, n.id, ConversationState::Rescheduling)
            .await?;
        let opening = messages::reschedule_opening(&days);
        conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &opening).await?;
        activity::record(
            &self.db,
            "reschedule.started",
            "rescheduling conversation opened",
            Some(n.id),
        )
        .await?;
        info!(notification_id = n.id, "rescheduling conversation opened");
        self.send_best_effort(&n.phone, &opening).await;
        Ok(())
    }

    /// Process one customer turn of an active rescheduling conversation.
    pub(crate) async fn reschedule_turn(
        &self,
        n: &Notification,
        text: &str,
        today: NaiveDate,
    ) -> Result<(), DroplineError> {
        conversations::append_turn(&self.db, n.id, TurnRole::Customer, text).await?;

        // A policy can disappear between restarts if configuration
        // changed mid-conversation; treat it like an oracle outage.
        let Some(policy) = self.policies.store_policy(&n.store) else {
            warn!(notification_id = n.id, store = %n.store, "day policy vanished mid-conversation");
            self.send_trouble(n).await?;
            return Ok(());
        };
        let allowed_days = policy.reschedule_days();

        let history = conversations::turns_for(&self.db, n.id)
            .await?
            .into_iter()
            .map(|t| (t.role, t.content))
            .collect();

        let request = ExtractionRequest {
            today,
            original_date: n.delivery_date,
            address: n.address.clone(),
            store_name: n.store.clone(),
            allowed_days: allowed_days.clone(),
            policy_notes: policy.notes.clone(),
            history,
        };

        let intent = match self.oracle.extract(&request).await {
            Ok(intent) => intent,
            Err(e) => {
                // Transient: the customer may simply try again.
                warn!(notification_id = n.id, error = %e, "oracle call failed");
                activity::record(
                    &self.db,
                    "oracle.failed",
                    &e.to_string(),
                    Some(n.id),
                )
                .await?;
                self.send_trouble(n).await?;
                return Ok(());
            }
        };

        match intent {
            SchedulingIntent::Clarify { reply } => {
                conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &reply).await?;
                self.send_best_effort(&n.phone, &reply).await;
            }
            SchedulingIntent::Handoff { reply } => {
                notifications::set_conversation_state(&self.db, n.id, ConversationState::Handoff)
                    .await?;
                conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &reply).await?;
                activity::record(
                    &self.db,
                    "reschedule.handoff",
                    "oracle requested human handoff",
                    Some(n.id),
                )
                .await?;
                info!(notification_id = n.id, "conversation handed off to a human");
                self.send_best_effort(&n.phone, &reply).await;
            }
            SchedulingIntent::ConfirmDate { date } => {
                match validate_proposed_date(date, today, &allowed_days, &self.policies) {
                    Err(rejection) => {
                        let reply = rejection.customer_message(date);
                        conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &reply)
                            .await?;
                        activity::record(
                            &self.db,
                            "reschedule.rejected",
                            &format!("proposed {date}: {rejection:?}"),
                            Some(n.id),
                        )
                        .await?;
                        self.send_best_effort(&n.phone, &reply).await;
                    }
                    Ok(()) => self.apply_confirmed_date(n, date).await?,
                }
            }
        }

        Ok(())
    }

    /// Close out a validated reschedule: mark the original, create the new
    /// pending row, and best-effort notify the route-planning provider.
    async fn apply_confirmed_date(
        &self,
        n: &Notification,
        date: NaiveDate,
    ) -> Result<(), DroplineError> {
        notifications::mark_rescheduled(&self.db, n.id).await?;

        // Time window stays TBD until routing assigns a slot.
        let new_id = notifications::insert(
            &self.db,
            &NewNotification {
                external_id: None,
                customer_name: n.customer_name.clone(),
                phone: n.phone.clone(),
                store: n.store.clone(),
                address: n.address.clone(),
                delivery_date: date,
                time_window: "TBD".into(),
                raw_time: None,
                product: n.product.clone(),
                driver: None,
                rescheduled_from: Some(n.id),
            },
        )
        .await?
        .ok_or_else(|| {
            DroplineError::Internal("insert without external_id reported a conflict".into())
        })?;

        activity::record(
            &self.db,
            "reschedule.confirmed",
            &format!("new notification {new_id} for {date}"),
            Some(n.id),
        )
        .await?;
        info!(
            notification_id = n.id,
            new_id,
            date = %date,
            "reschedule confirmed"
        );

        // Best-effort: the local pending record is authoritative even if
        // the provider never hears about the new stop.
        if let Some(planner) = &self.planner
            && let Err(e) = planner
                .push_unassigned_stop(UnassignedStop {
                    customer_name: n.customer_name.clone(),
                    phone: n.phone.clone(),
                    address: n.address.clone(),
                    delivery_date: date,
                    product: n.product.clone(),
                })
                .await
        {
            warn!(notification_id = n.id, error = %e, "provider stop push failed");
            activity::record(
                &self.db,
                "provider.push_failed",
                &e.to_string(),
                Some(n.id),
            )
            .await?;
        }

        let reply = messages::reschedule_confirmed(date);
        conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &reply).await?;
        self.send_best_effort(&n.phone, &reply).await;
        Ok(())
    }

    async fn send_trouble(&self, n: &Notification) -> Result<(), DroplineError> {
        let reply = messages::trouble_reply();
        conversations::append_turn(&self.db, n.id, TurnRole::Assistant, &reply).await?;
        self.send_best_effort(&n.phone, &reply).await;
        Ok(())
    }
}
