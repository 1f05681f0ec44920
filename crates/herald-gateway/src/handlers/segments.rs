// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment handlers.
//!
//! Creation evaluates the rules once and stores the audience size as a
//! snapshot; preview evaluates without persisting anything.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::rules::SegmentRules;
use herald_core::types::{NewSegment, Segment};
use herald_core::HeraldError;
use herald_engine::audience::resolve_audience;
use herald_storage::queries::{customers, segments};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /v1/segments/preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub rules: SegmentRules,
}

/// Response body for POST /v1/segments/preview.
#[derive(Debug, PartialEq, Serialize)]
pub struct PreviewResponse {
    /// Customers the rules match right now.
    pub audience_size: usize,
    /// Share of the whole customer base, one decimal.
    pub percentage: f64,
    /// Mean total_spent over the audience, whole rupees.
    pub avg_spend: f64,
    /// Share of the audience with more than 5 visits, whole percent.
    pub engagement_rate: f64,
}

/// POST /v1/segments
pub async fn create(
    State(state): State<GatewayState>,
    Json(body): Json<NewSegment>,
) -> Result<(StatusCode, Json<Segment>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(HeraldError::Validation("segment name is required".into()).into());
    }
    let audience = resolve_audience(&state.db, &body.rules).await?;
    let segment = segments::insert(&state.db, &body, audience.len() as i64).await?;
    Ok((StatusCode::CREATED, Json(segment)))
}

/// GET /v1/segments
pub async fn list(State(state): State<GatewayState>) -> Result<Json<Vec<Segment>>, ApiError> {
    let segments = segments::list(&state.db).await?;
    Ok(Json(segments))
}

/// GET /v1/segments/{id}
pub async fn get(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<Segment>, ApiError> {
    let segment = segments::get(&state.db, id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "segment".to_string(),
            id,
        })?;
    Ok(Json(segment))
}

/// POST /v1/segments/preview
pub async fn preview(
    State(state): State<GatewayState>,
    Json(body): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let audience = resolve_audience(&state.db, &body.rules).await?;
    let total = customers::count(&state.db).await?;

    let audience_size = audience.len();
    let (avg_spend, engagement_rate) = if audience_size > 0 {
        let spend: f64 = audience.iter().map(|c| c.total_spent).sum();
        let engaged = audience.iter().filter(|c| c.visit_count > 5).count();
        (
            (spend / audience_size as f64).round(),
            (engaged as f64 / audience_size as f64 * 100.0).round(),
        )
    } else {
        (0.0, 0.0)
    };
    let percentage = if total > 0 {
        (audience_size as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(Json(PreviewResponse {
        audience_size,
        percentage,
        avg_spend,
        engagement_rate,
    }))
}
