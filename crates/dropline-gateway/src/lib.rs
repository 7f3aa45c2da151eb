// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook and admin HTTP surface for the Dropline delivery notifier.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{BatchDeps, GatewayState, ServerConfig, build_router, start_server};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Days, Local, NaiveDate};
    use dropline_config::{DeliveryPolicies, model::DeliveryConfig};
    use dropline_core::NotificationStatus;
    use dropline_engine::Engine;
    use dropline_ingest::IngestionGateway;
    use dropline_storage::queries::notifications;
    use dropline_test_utils::{FakeOracle, MockSms, StorageHarness};
    use http_body_util::BodyExt as _;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    const PHONE: &str = "+15553334444";

    fn policies() -> DeliveryPolicies {
        // Accept every weekday so "tomorrow" is always ingestible no
        // matter which day the test runs on.
        DeliveryPolicies::from_config(&DeliveryConfig {
            default_days: ["mon", "tue", "wed", "thu", "fri", "sat", "sun"]
                .into_iter()
                .map(String::from)
                .collect(),
            ..Default::default()
        })
        .unwrap()
    }

    struct TestGateway {
        harness: StorageHarness,
        sms: Arc<MockSms>,
        router: axum::Router,
    }

    async fn test_gateway(bearer: Option<&str>) -> TestGateway {
        let harness = StorageHarness::new().await;
        let sms = Arc::new(MockSms::new());
        let oracle = Arc::new(FakeOracle::new());

        let engine = Arc::new(Engine::new(
            harness.db.clone(),
            sms.clone(),
            oracle,
            None,
            policies(),
        ));
        let ingestion = Arc::new(IngestionGateway::new(harness.db.clone(), policies(), None));
        let batch = Arc::new(BatchDeps {
            db: harness.db.clone(),
            sms: sms.clone(),
            writer: None,
            staff_recipients: vec!["+15559990042".into()],
            send_delay: Duration::ZERO,
        });

        let state = GatewayState {
            engine,
            ingestion,
            batch,
            auth: AuthConfig {
                bearer_token: bearer.map(String::from),
            },
        };

        TestGateway {
            harness,
            sms,
            router: build_router(state),
        }
    }

    async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn tomorrow() -> NaiveDate {
        Local::now().date_naive() + Days::new(1)
    }

    #[tokio::test]
    async fn health_is_public() {
        let gw = test_gateway(None).await;
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn delivery_webhook_ingests_and_always_200s() {
        let gw = test_gateway(None).await;
        let date = tomorrow();

        let (status, _) = send(
            &gw.router,
            json_post(
                "/webhooks/deliveries",
                json!({"stop": {
                    "id": "wh-1",
                    "customer_name": "Casey",
                    "phone": PHONE,
                    "address": "9 Pine Rd",
                    "scheduled_date": date.to_string(),
                    "arrival_time": "10:00 AM"
                }}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let pending = notifications::pending_for_date(&gw.harness.db, date)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        // Garbage body is still acknowledged.
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/deliveries")
            .body(Body::from("not json at all"))
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn sms_webhook_classifies_json_and_form_shapes() {
        let gw = test_gateway(None).await;
        let id = gw
            .harness
            .seed_sent("wh-sms", PHONE, "unknown", tomorrow())
            .await;

        // JSON envelope shape.
        let (status, _) = send(
            &gw.router,
            json_post(
                "/webhooks/sms",
                json!({"direction": "incoming", "from": PHONE, "body": "YES"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let n = notifications::get(&gw.harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);

        // Outgoing events are acknowledged and ignored.
        let other = gw
            .harness
            .seed_sent("wh-sms2", "+15553335555", "unknown", tomorrow())
            .await;
        let (status, _) = send(
            &gw.router,
            json_post(
                "/webhooks/sms",
                json!({"direction": "outgoing", "from": "+15553335555", "body": "YES"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let n = notifications::get(&gw.harness.db, other).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Sent);

        // Twilio form shape.
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/sms")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "From={}&Body=YES",
                "%2B15553335555"
            )))
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
        let n = notifications::get(&gw.harness.db, other).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
    }

    #[tokio::test]
    async fn admin_routes_require_bearer_token() {
        let gw = test_gateway(Some("secret")).await;

        let request = Request::builder()
            .method("POST")
            .uri("/admin/send-batch")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method("POST")
            .uri("/admin/send-batch")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_without_configured_token_is_fail_closed() {
        let gw = test_gateway(None).await;
        let request = Request::builder()
            .method("POST")
            .uri("/admin/send-batch")
            .header(header::AUTHORIZATION, "Bearer anything")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_send_batch_fires_same_path_as_scheduler() {
        let gw = test_gateway(Some("secret")).await;
        let id = gw
            .harness
            .seed_pending("wh-batch", PHONE, "unknown", tomorrow())
            .await;

        let request = Request::builder()
            .method("POST")
            .uri("/admin/send-batch")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], 1);

        let n = notifications::get(&gw.harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Sent);
        assert_eq!(gw.sms.sent().len(), 1);
    }

    #[tokio::test]
    async fn admin_staff_summary_and_resend() {
        let gw = test_gateway(Some("secret")).await;
        let id = gw
            .harness
            .seed_pending("wh-re", PHONE, "unknown", tomorrow())
            .await;

        let request = Request::builder()
            .method("POST")
            .uri("/admin/staff-summary")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gw.sms.bodies_to("+15559990042").len(), 1);

        let request = Request::builder()
            .method("POST")
            .uri(format!("/admin/resend/{id}"))
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);

        let n = notifications::get(&gw.harness.db, id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Sent);

        // The operator view shows what just happened, newest first.
        let request = Request::builder()
            .uri("/admin/activity")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&gw.router, request).await;
        assert_eq!(status, StatusCode::OK);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events[0]["event_type"], "resend.sent");
    }
}
