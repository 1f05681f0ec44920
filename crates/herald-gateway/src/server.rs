// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Three route groups:
//! public machine endpoints (health, metrics, ingestion, delivery
//! receipts) and the bearer-protected user-facing API.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use herald_assist::AssistClient;
use herald_core::HeraldError;
use herald_storage::Database;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Storage handle shared with the delivery workers.
    pub db: Database,
    /// Assist client; `None` serves 503 on the assist routes.
    pub assist: Option<Arc<AssistClient>>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Health state for unauthenticated endpoints.
    pub health: HealthState,
}

/// Gateway server configuration (mirrors the `[server]` section of
/// `herald-config` to avoid a dependency on the config crate).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the full gateway router.
///
/// Ingestion and receipt routes stay public: they are called by upstream
/// systems and the delivery vendor, which hold no user credentials. The
/// same paths can still carry authenticated methods (`GET /v1/customers`)
/// because the method routers merge per path.
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated machine endpoints.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .route("/v1/customers", post(handlers::customers::create))
        .route("/v1/orders", post(handlers::orders::create))
        .route("/v1/delivery-receipt", post(handlers::receipts::create))
        .with_state(state.clone());

    // User-facing routes behind bearer auth.
    let api_routes = Router::new()
        .route("/v1/customers", get(handlers::customers::list))
        .route("/v1/customers/{id}", get(handlers::customers::get))
        .route(
            "/v1/customers/{id}/orders",
            get(handlers::orders::list_for_customer),
        )
        .route("/v1/segments", post(handlers::segments::create))
        .route("/v1/segments", get(handlers::segments::list))
        .route("/v1/segments/preview", post(handlers::segments::preview))
        .route("/v1/segments/{id}", get(handlers::segments::get))
        .route("/v1/campaigns", post(handlers::campaigns::create))
        .route("/v1/campaigns", get(handlers::campaigns::list))
        .route("/v1/campaigns/{id}", get(handlers::campaigns::get))
        .route("/v1/campaigns/{id}/logs", get(handlers::campaigns::logs))
        .route("/v1/dashboard/stats", get(handlers::dashboard::stats))
        .route(
            "/v1/assist/segment-rules",
            post(handlers::assist::segment_rules),
        )
        .route("/v1/assist/messages", post(handlers::assist::messages))
        .route(
            "/v1/assist/campaign-insights/{id}",
            post(handlers::assist::campaign_insights),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until the cancellation
/// token fires, then drains in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), HeraldError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HeraldError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| HeraldError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
