// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer ingestion and lookup handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::{Customer, NewCustomer};
use herald_core::HeraldError;
use herald_storage::queries::customers;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query parameters for GET /v1/customers.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

fn validate(new: &NewCustomer) -> Result<(), HeraldError> {
    if new.name.trim().is_empty() {
        return Err(HeraldError::Validation("customer name is required".into()));
    }
    if new.email.trim().is_empty() || !new.email.contains('@') {
        return Err(HeraldError::Validation(format!(
            "invalid customer email: {:?}",
            new.email
        )));
    }
    if new.total_spent < 0.0 {
        return Err(HeraldError::Validation(
            "total_spent must be non-negative".into(),
        ));
    }
    if new.visit_count < 0 {
        return Err(HeraldError::Validation(
            "visit_count must be non-negative".into(),
        ));
    }
    Ok(())
}

/// POST /v1/customers
pub async fn create(
    State(state): State<GatewayState>,
    Json(body): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    validate(&body)?;
    let customer = customers::insert(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /v1/customers?limit&offset
pub async fn list(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = customers::list(&state.db, params.limit, params.offset).await?;
    Ok(Json(customers))
}

/// GET /v1/customers/{id}
pub async fn get(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, ApiError> {
    let customer = customers::get(&state.db, id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "customer".to_string(),
            id,
        })?;
    Ok(Json(customer))
}
