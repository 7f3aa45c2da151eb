// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dropline serve` command implementation.
//!
//! Wires storage, the SMS client, the extraction oracle, the
//! reply/reschedule engine, the ingestion gateway, the daily scheduler,
//! and the webhook server, then runs until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dropline_config::{DeliveryPolicies, model::DroplineConfig};
use dropline_core::{DroplineError, SmsSender};
use dropline_engine::Engine;
use dropline_gateway::{AuthConfig, BatchDeps, GatewayState, ServerConfig};
use dropline_ingest::IngestionGateway;
use dropline_oracle::{
    AnthropicClient, AnthropicExtractor, AnthropicSummaryWriter, ExtractionOracle,
    ExtractionRequest, SchedulingIntent, SummaryWriter,
};
use dropline_scheduler::SchedulerEngine;
use dropline_sms::SmsClient;
use dropline_storage::Database;
use tracing::{error, info, warn};

use crate::shutdown;

/// Placeholder oracle used when no API key is configured.
///
/// The service still runs; a rescheduling turn fails fast at the call
/// site with a clear message, the customer gets the generic trouble
/// reply, and the conversation stays open.
struct UnconfiguredOracle;

#[async_trait]
impl ExtractionOracle for UnconfiguredOracle {
    async fn extract(
        &self,
        _request: &ExtractionRequest,
    ) -> Result<SchedulingIntent, DroplineError> {
        Err(DroplineError::Config(
            "oracle.api_key is required for automated rescheduling".into(),
        ))
    }
}

/// Runs the `dropline serve` command.
pub async fn run_serve(config: DroplineConfig) -> Result<(), DroplineError> {
    init_tracing(&config.app.log_level);
    info!("starting dropline serve");

    let policies = DeliveryPolicies::from_config(&config.delivery)?;

    // Storage.
    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "storage ready");

    // SMS gateway: the one hard requirement.
    let sms: Arc<dyn SmsSender> = {
        let client = SmsClient::new(&config.sms).map_err(|e| {
            error!(error = %e, "failed to initialize SMS client");
            eprintln!(
                "error: SMS credentials required. Set sms.account_sid, sms.auth_token, \
                 and sms.from_number via config or DROPLINE_SMS_* environment variables."
            );
            e
        })?;
        Arc::new(client)
    };

    // Extraction oracle and summary writer, degraded when unconfigured.
    let (oracle, writer): (Arc<dyn ExtractionOracle>, Option<Arc<dyn SummaryWriter>>) =
        match AnthropicClient::new(&config.oracle) {
            Ok(client) => (
                Arc::new(AnthropicExtractor::new(client.clone())),
                Some(Arc::new(AnthropicSummaryWriter::new(client))),
            ),
            Err(e) => {
                warn!(error = %e, "oracle unconfigured, rescheduling degrades to manual follow-up");
                (Arc::new(UnconfiguredOracle), None)
            }
        };

    // Engines.
    let engine = Arc::new(Engine::new(
        db.clone(),
        sms.clone(),
        oracle,
        None,
        policies.clone(),
    ));
    let ingestion = Arc::new(IngestionGateway::new(db.clone(), policies, None));

    // Daily scheduler task.
    let cancel = shutdown::install_signal_handler();
    let scheduler = SchedulerEngine::new(db.clone(), sms.clone(), writer.clone(), &config.scheduler)?;
    let scheduler_task = tokio::spawn(scheduler.run(cancel.clone()));

    // Webhook server.
    let staff_recipients = config
        .scheduler
        .staff_numbers
        .iter()
        .filter_map(|n| dropline_core::phone::normalize(n))
        .collect();
    let state = GatewayState {
        engine,
        ingestion,
        batch: Arc::new(BatchDeps {
            db: db.clone(),
            sms,
            writer,
            staff_recipients,
            send_delay: Duration::from_millis(config.scheduler.send_delay_ms),
        }),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
    };
    if config.gateway.bearer_token.is_none() {
        warn!("no gateway.bearer_token configured, admin trigger surface is disabled");
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    tokio::select! {
        result = dropline_gateway::start_server(&server_config, state) => {
            error!("gateway server exited");
            result?;
        }
        _ = cancel.cancelled() => {
            info!("shutdown requested");
        }
    }

    let _ = scheduler_task.await;
    db.close().await?;
    info!("dropline serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dropline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
