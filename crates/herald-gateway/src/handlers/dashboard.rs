// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard aggregate handler.

use axum::extract::State;
use axum::Json;
use herald_storage::models::DashboardStats;
use herald_storage::queries::dashboard;

use crate::error::ApiError;
use crate::server::GatewayState;

/// GET /v1/dashboard/stats
pub async fn stats(State(state): State<GatewayState>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = dashboard::stats(&state.db).await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::server::HealthState;
    use herald_storage::Database;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stats_of_an_empty_database_are_zero() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let state = GatewayState {
            db,
            assist: None,
            auth: AuthConfig { bearer_token: None },
            health: HealthState {
                start_time: std::time::Instant::now(),
                prometheus_render: None,
            },
        };

        let Json(stats) = stats(State(state.clone())).await.unwrap();
        assert_eq!(stats.total_customers, 0);
        assert_eq!(stats.active_campaigns, 0);
        assert_eq!(stats.avg_delivery_rate, 0.0);
        assert_eq!(stats.total_revenue, 0.0);

        state.db.close().await.unwrap();
        drop(dir);
    }
}
