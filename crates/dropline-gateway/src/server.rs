// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Public routes: provider webhooks and health. Admin routes sit behind
//! bearer auth and reuse the scheduler's batch functions verbatim.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use dropline_core::{DroplineError, SmsSender};
use dropline_engine::Engine;
use dropline_ingest::IngestionGateway;
use dropline_oracle::SummaryWriter;
use dropline_storage::Database;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Dependencies for the admin batch triggers, mirroring what the
/// scheduler holds so both paths behave identically.
pub struct BatchDeps {
    pub db: Database,
    pub sms: Arc<dyn SmsSender>,
    pub writer: Option<Arc<dyn SummaryWriter>>,
    pub staff_recipients: Vec<String>,
    pub send_delay: Duration,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<Engine>,
    pub ingestion: Arc<IngestionGateway>,
    pub batch: Arc<BatchDeps>,
    pub auth: AuthConfig,
}

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full route tree for the gateway.
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/webhooks/deliveries", post(handlers::post_deliveries))
        .route("/webhooks/sms", post(handlers::post_sms))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/send-batch", post(handlers::post_send_batch))
        .route("/admin/staff-summary", post(handlers::post_staff_summary))
        .route("/admin/resend/{id}", post(handlers::post_resend))
        .route("/admin/activity", get(handlers::get_activity))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the task is aborted.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), DroplineError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DroplineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| DroplineError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
