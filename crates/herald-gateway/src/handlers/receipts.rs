// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound delivery receipt handler.
//!
//! The vendor calls this endpoint after the fact; it finalizes the
//! communication log row the dispatch created. Public like the ingestion
//! routes: the vendor holds no user credentials.

use axum::extract::State;
use axum::Json;
use herald_core::vendor::DeliveryReceipt;
use herald_engine::receipts::apply_receipt;
use serde::Serialize;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for POST /v1/delivery-receipt.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub message: String,
}

/// POST /v1/delivery-receipt
///
/// 404 on an unknown log id, 400 on a status outside SENT/FAILED.
pub async fn create(
    State(state): State<GatewayState>,
    Json(receipt): Json<DeliveryReceipt>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    apply_receipt(&state.db, &receipt).await?;
    Ok(Json(ReceiptResponse {
        message: "Delivery receipt processed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::server::HealthState;
    use axum::http::StatusCode;
    use chrono::Utc;
    use herald_core::rules::SegmentRules;
    use herald_core::types::{LogStatus, NewCampaign, NewCustomer, NewSegment};
    use herald_storage::queries::{campaigns, comm_logs, customers, segments};
    use herald_storage::Database;
    use tempfile::tempdir;

    async fn setup_state() -> (GatewayState, tempfile::TempDir) {
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
        (state, dir)
    }

    async fn seed_pending_log(state: &GatewayState) -> i64 {
        let customer = customers::insert(
            &state.db,
            &NewCustomer {
                name: "Priya Sharma".into(),
                email: "priya@example.com".into(),
                phone: None,
                total_spent: 0.0,
                visit_count: 0,
                last_purchase_date: None,
                is_active: true,
            },
        )
        .await
        .unwrap();
        let segment = segments::insert(
            &state.db,
            &NewSegment {
                name: "Everyone".into(),
                description: None,
                rules: SegmentRules::default(),
                created_by: None,
            },
            1,
        )
        .await
        .unwrap();
        let campaign = campaigns::insert(
            &state.db,
            &NewCampaign {
                name: "Launch".into(),
                segment_id: segment.id,
                message: "Hi {name}".into(),
                created_by: None,
            },
        )
        .await
        .unwrap();
        comm_logs::insert_pending(&state.db, campaign.id, customer.id, "Hi Priya Sharma")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn receipt_finalizes_the_log() {
        let (state, _dir) = setup_state().await;
        let log_id = seed_pending_log(&state).await;

        let Json(response) = create(
            State(state.clone()),
            Json(DeliveryReceipt {
                log_id,
                vendor_id: "vendor_1724500000000_abc123xyz".into(),
                status: "SENT".into(),
                delivered_at: Some(Utc::now()),
                failure_reason: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.message, "Delivery receipt processed");

        let log = comm_logs::get(&state.db, log_id).await.unwrap().unwrap();
        assert_eq!(log.status, LogStatus::Sent);
        assert_eq!(log.vendor_id.as_deref(), Some("vendor_1724500000000_abc123xyz"));

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_log_is_404() {
        let (state, _dir) = setup_state().await;

        let err = create(
            State(state.clone()),
            Json(DeliveryReceipt {
                log_id: 9999,
                vendor_id: "vendor_1_a".into(),
                status: "SENT".into(),
                delivered_at: None,
                failure_reason: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_status_is_400() {
        let (state, _dir) = setup_state().await;
        let log_id = seed_pending_log(&state).await;

        let err = create(
            State(state.clone()),
            Json(DeliveryReceipt {
                log_id,
                vendor_id: "vendor_1_a".into(),
                status: "BOUNCED".into(),
                delivered_at: None,
                failure_reason: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        state.db.close().await.unwrap();
    }
}
