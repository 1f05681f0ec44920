// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order ingestion handlers.
//!
//! Order creation is the only write path that touches customer purchase
//! aggregates; the storage layer applies both in one transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::{NewOrder, Order};
use herald_core::HeraldError;
use herald_storage::queries::orders;

use crate::error::ApiError;
use crate::server::GatewayState;

/// POST /v1/orders
///
/// 400 on a non-positive amount, 404 on an unknown customer.
pub async fn create(
    State(state): State<GatewayState>,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    if body.amount <= 0.0 {
        return Err(HeraldError::Validation("order amount must be positive".into()).into());
    }
    let order = orders::insert(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/customers/{id}/orders
pub async fn list_for_customer(
    State(state): State<GatewayState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = orders::list_by_customer(&state.db, customer_id).await?;
    Ok(Json(orders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::server::HealthState;
    use herald_core::types::NewCustomer;
    use herald_storage::queries::customers;
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

    async fn seed_customer(state: &GatewayState) -> i64 {
        customers::insert(
            &state.db,
            &NewCustomer {
                name: "Sneha Reddy".into(),
                email: "sneha@example.com".into(),
                phone: None,
                total_spent: 0.0,
                visit_count: 0,
                last_purchase_date: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn create_updates_customer_aggregates() {
        let (state, _dir) = setup_state().await;
        let customer_id = seed_customer(&state).await;

        let (status, Json(order)) = create(
            State(state.clone()),
            Json(NewOrder {
                customer_id,
                amount: 2500.0,
                order_date: None,
                status: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order.status, "completed");

        let customer = customers::get(&state.db, customer_id).await.unwrap().unwrap();
        assert_eq!(customer.total_spent, 2500.0);
        assert_eq!(customer.visit_count, 1);
        assert!(customer.last_purchase_date.is_some());

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_rejects_non_positive_amounts() {
        let (state, _dir) = setup_state().await;
        let customer_id = seed_customer(&state).await;

        let err = create(
            State(state.clone()),
            Json(NewOrder {
                customer_id,
                amount: 0.0,
                order_date: None,
                status: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_returns_404_for_unknown_customer() {
        let (state, _dir) = setup_state().await;

        let err = create(
            State(state.clone()),
            Json(NewOrder {
                customer_id: 9999,
                amount: 100.0,
                order_date: None,
                status: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_for_customer_scopes_to_that_customer() {
        let (state, _dir) = setup_state().await;
        let customer_id = seed_customer(&state).await;

        for amount in [100.0, 200.0] {
            create(
                State(state.clone()),
                Json(NewOrder {
                    customer_id,
                    amount,
                    order_date: None,
                    status: None,
                }),
            )
            .await
            .unwrap();
        }

        let Json(orders) = list_for_customer(State(state.clone()), Path(customer_id))
            .await
            .unwrap();
        assert_eq!(orders.len(), 2);

        let Json(none) = list_for_customer(State(state.clone()), Path(9999))
            .await
            .unwrap();
        assert!(none.is_empty());

        state.db.close().await.unwrap();
    }
}
