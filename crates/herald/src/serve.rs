// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Starts the full herald server: SQLite storage, the simulated delivery
//! vendor with its receipt drain task, the delivery worker pool, the
//! optional assist client, and the axum gateway. Supports graceful
//! shutdown via signal handlers; a campaign run already in flight always
//! finishes before its worker exits.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use herald_assist::AssistClient;
use herald_config::model::HeraldConfig;
use herald_core::HeraldError;
use herald_engine::receipts;
use herald_engine::recording;
use herald_engine::shutdown;
use herald_engine::{CampaignRunner, DeliveryWorker, DELIVERY_QUEUE};
use herald_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use herald_storage::queries::{campaigns, queue};
use herald_storage::Database;
use herald_vendor::SimulatedVendor;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Buffered receipts between the vendor's delayed emitters and the drain
/// task. Senders block (briefly) when the drain falls this far behind.
const RECEIPT_CHANNEL_CAPACITY: usize = 256;

/// Runs the `herald serve` command.
///
/// Wires storage, vendor, workers, and gateway together and serves until
/// SIGINT or SIGTERM.
pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    // Initialize tracing subscriber.
    init_tracing(&config.server.log_level);

    info!("starting herald serve");

    // Initialize storage.
    let db = Database::open(&config.storage.database_path).await?;
    info!(
        path = config.storage.database_path.as_str(),
        "database ready"
    );

    // Mark delivery runs a previous process left mid-flight as failed
    // (crash recovery).
    fail_interrupted_runs(&db).await?;

    // Initialize Prometheus metrics (if enabled).
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> = if config.metrics.enabled
    {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                recording::register_metrics();
                info!("prometheus metrics enabled");
                Some(Arc::new(move || handle.render()) as Arc<dyn Fn() -> String + Send + Sync>)
            }
            Err(e) => {
                warn!(error = %e, "prometheus initialization failed, continuing without metrics");
                None
            }
        }
    } else {
        debug!("prometheus metrics disabled by configuration");
        None
    };

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // The vendor emits delivery receipts onto this channel after a delay;
    // the drain task applies them to the communication log.
    let (receipt_tx, mut receipt_rx) = mpsc::channel(RECEIPT_CHANNEL_CAPACITY);
    {
        let db = db.clone();
        let drain_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = receipt_rx.recv() => {
                        match received {
                            Some(receipt) => {
                                if let Err(e) = receipts::apply_receipt(&db, &receipt).await {
                                    warn!(log_id = receipt.log_id, error = %e, "delivery receipt rejected");
                                }
                            }
                            None => break,
                        }
                    }
                    _ = drain_cancel.cancelled() => {
                        info!("receipt drain task shutting down");
                        break;
                    }
                }
            }
        });
    }

    // Vendor and campaign runner shared by every delivery worker.
    let vendor = Arc::new(SimulatedVendor::new(config.vendor.clone(), receipt_tx));
    let runner = Arc::new(CampaignRunner::new(
        db.clone(),
        vendor,
        Duration::from_millis(config.delivery.pacing_ms),
    ));

    // Workers share one in-flight map so a campaign never runs twice
    // concurrently.
    let in_flight = Arc::new(DashMap::new());
    let mut workers = Vec::with_capacity(config.delivery.workers);
    for worker_id in 0..config.delivery.workers {
        let worker = DeliveryWorker::new(
            worker_id,
            db.clone(),
            runner.clone(),
            Duration::from_millis(config.delivery.poll_interval_ms),
            in_flight.clone(),
        );
        let worker_cancel = cancel.clone();
        workers.push(tokio::spawn(async move {
            worker.run(worker_cancel).await;
        }));
    }
    info!(
        workers = config.delivery.workers,
        poll_interval_ms = config.delivery.poll_interval_ms,
        "delivery workers started"
    );

    // Initialize the assist client (if an API key is configured).
    let assist = if config.assist.api_key.is_some() {
        let client = AssistClient::new(&config.assist).map_err(|e| {
            error!(error = %e, "failed to initialize assist client");
            e
        })?;
        info!(
            model = config.assist.model.as_str(),
            "assist endpoints enabled"
        );
        Some(Arc::new(client))
    } else {
        info!("assist endpoints disabled (no api key configured)");
        None
    };

    if config.server.bearer_token.is_none() {
        warn!("no bearer token configured, user-facing routes are unauthenticated");
    }

    let state = GatewayState {
        db: db.clone(),
        assist,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    // Serve until a shutdown signal arrives.
    herald_gateway::start_server(&server_config, state, cancel.clone()).await?;

    // Let in-flight campaign runs finish before exiting.
    for handle in workers {
        if handle.await.is_err() {
            error!("delivery worker task panicked");
        }
    }

    info!("herald serve shutdown complete");
    Ok(())
}

/// Marks whatever a previous process left mid-delivery as failed.
///
/// A queue entry still `processing` has no worker behind it, and its
/// half-delivered campaign must not be silently re-run; both go terminal.
async fn fail_interrupted_runs(db: &Database) -> Result<(), HeraldError> {
    let entries = queue::fail_abandoned(db, DELIVERY_QUEUE).await?;
    let interrupted = campaigns::fail_interrupted(db).await?;
    if entries > 0 || interrupted > 0 {
        info!(
            entries,
            campaigns = interrupted,
            "marked interrupted delivery runs as failed"
        );
    }
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // Workspace crates at the configured level, dependencies at warn.
    let directives = [
        "herald",
        "herald_storage",
        "herald_engine",
        "herald_vendor",
        "herald_assist",
        "herald_gateway",
    ]
    .map(|krate| format!("{krate}={log_level}"))
    .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
