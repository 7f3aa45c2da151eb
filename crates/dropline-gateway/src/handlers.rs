// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers: provider webhooks, admin triggers, health.
//!
//! Both webhooks always answer 200, even on internal processing errors;
//! a non-2xx would only trigger the providers' retry storms against a
//! failure they cannot fix. Admin triggers invoke the same batch
//! functions as the scheduler, so operator action and timer action are
//! indistinguishable in behavior.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Days, Local};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::server::GatewayState;

/// POST /webhooks/deliveries
///
/// Polymorphic delivery events from the route-planning provider.
pub async fn post_deliveries(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    let payload = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "delivery webhook with non-JSON body");
            return (StatusCode::OK, Json(json!({"ok": true})));
        }
    };

    match state.ingestion.ingest(payload).await {
        Ok(report) => {
            debug!(
                inserted = report.inserted,
                duplicates = report.duplicates,
                skipped = report.skipped,
                "delivery webhook processed"
            );
        }
        Err(e) => {
            // Still 200: the provider retrying won't fix our storage.
            error!(error = %e, "delivery webhook processing failed");
        }
    }

    (StatusCode::OK, Json(json!({"ok": true})))
}

/// Inbound SMS event, tolerant of both the gateway's JSON envelope and
/// Twilio's form encoding.
#[derive(Debug, Deserialize)]
struct InboundSmsEvent {
    #[serde(default, alias = "Direction")]
    direction: Option<String>,
    #[serde(default, alias = "From", alias = "sender")]
    from: Option<String>,
    #[serde(default, alias = "Body", alias = "text", alias = "message")]
    body: Option<String>,
}

/// POST /webhooks/sms
///
/// Inbound customer replies from the SMS gateway.
pub async fn post_sms(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    let event = serde_json::from_slice::<InboundSmsEvent>(&body)
        .ok()
        .or_else(|| serde_urlencoded::from_bytes::<InboundSmsEvent>(&body).ok());

    let Some(event) = event else {
        debug!("sms webhook with undecodable body, acknowledged and ignored");
        return (StatusCode::OK, Json(json!({"ok": true})));
    };

    // Only incoming messages are classified; an absent direction means
    // the gateway only pushes inbound traffic (Twilio's form shape).
    if let Some(direction) = event.direction.as_deref()
        && !matches!(direction, "incoming" | "inbound")
    {
        debug!(direction, "ignoring non-incoming sms event");
        return (StatusCode::OK, Json(json!({"ok": true})));
    }

    let (Some(from), Some(text)) = (event.from, event.body) else {
        debug!("sms webhook missing sender or body, acknowledged and ignored");
        return (StatusCode::OK, Json(json!({"ok": true})));
    };

    if let Err(e) = state.engine.handle_inbound_sms(&from, &text).await {
        error!(error = %e, "sms webhook processing failed");
    }

    (StatusCode::OK, Json(json!({"ok": true})))
}

/// POST /admin/send-batch
///
/// Force-fire the customer-send batch for tomorrow's deliveries.
pub async fn post_send_batch(State(state): State<GatewayState>) -> impl IntoResponse {
    let target = Local::now().date_naive() + Days::new(1);
    info!(date = %target, "manual customer batch triggered");

    match dropline_scheduler::run_customer_batch(
        &state.batch.db,
        state.batch.sms.as_ref(),
        target,
        state.batch.send_delay,
    )
    .await
    {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "date": target.to_string(),
                "attempted": report.attempted,
                "sent": report.sent,
                "failed": report.failed,
            })),
        ),
        Err(e) => {
            error!(error = %e, "manual customer batch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "batch failed, see activity log"})),
            )
        }
    }
}

/// POST /admin/staff-summary
///
/// Force-fire the staff summary for tomorrow's deliveries.
pub async fn post_staff_summary(State(state): State<GatewayState>) -> impl IntoResponse {
    let target = Local::now().date_naive() + Days::new(1);
    info!(date = %target, "manual staff summary triggered");

    match dropline_scheduler::run_staff_summary(
        &state.batch.db,
        state.batch.sms.as_ref(),
        state.batch.writer.as_deref(),
        &state.batch.staff_recipients,
        target,
    )
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"date": target.to_string(), "ok": true})),
        ),
        Err(e) => {
            error!(error = %e, "manual staff summary failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "summary failed, see activity log"})),
            )
        }
    }
}

/// POST /admin/resend/{id}
///
/// Force a single resend through the batch transition semantics.
pub async fn post_resend(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!(notification_id = id, "manual resend triggered");
    match dropline_scheduler::resend_one(&state.batch.db, state.batch.sms.as_ref(), id).await {
        Ok(()) => (StatusCode::OK, Json(json!({"id": id, "ok": true}))),
        Err(e) => {
            error!(notification_id = id, error = %e, "manual resend failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "resend failed, see activity log"})),
            )
        }
    }
}

/// GET /admin/activity
///
/// The most recent activity events, newest first. This is the operator
/// view: machine-actionable detail that customers never see.
pub async fn get_activity(State(state): State<GatewayState>) -> impl IntoResponse {
    match dropline_storage::queries::activity::recent(&state.batch.db, 100).await {
        Ok(events) => {
            let events: Vec<_> = events
                .into_iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "event_type": e.event_type,
                        "detail": e.detail,
                        "notification_id": e.notification_id,
                        "created_at": e.created_at,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({"events": events})))
        }
        Err(e) => {
            error!(error = %e, "activity query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "activity query failed"})),
            )
        }
    }
}

/// GET /health
pub async fn get_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
