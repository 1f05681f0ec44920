// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign handlers.
//!
//! Creation stores the campaign as a draft and enqueues one delivery job;
//! the delivery worker picks it up asynchronously, so the response always
//! carries a draft row.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::{Campaign, CommunicationLog, NewCampaign};
use herald_core::HeraldError;
use herald_engine::enqueue_campaign;
use herald_storage::queries::{campaigns, comm_logs, segments};
use tracing::info;

use crate::error::ApiError;
use crate::server::GatewayState;

/// POST /v1/campaigns
pub async fn create(
    State(state): State<GatewayState>,
    Json(body): Json<NewCampaign>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(HeraldError::Validation("campaign name is required".into()).into());
    }
    if body.message.trim().is_empty() {
        return Err(HeraldError::Validation("campaign message is required".into()).into());
    }
    segments::get(&state.db, body.segment_id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "segment".to_string(),
            id: body.segment_id,
        })?;

    let campaign = campaigns::insert(&state.db, &body).await?;
    enqueue_campaign(&state.db, campaign.id).await?;
    info!(campaign_id = campaign.id, "campaign created, delivery enqueued");

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /v1/campaigns
pub async fn list(State(state): State<GatewayState>) -> Result<Json<Vec<Campaign>>, ApiError> {
    let campaigns = campaigns::list(&state.db).await?;
    Ok(Json(campaigns))
}

/// GET /v1/campaigns/{id}
pub async fn get(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = campaigns::get(&state.db, id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "campaign".to_string(),
            id,
        })?;
    Ok(Json(campaign))
}

/// GET /v1/campaigns/{id}/logs
pub async fn logs(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CommunicationLog>>, ApiError> {
    campaigns::get(&state.db, id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "campaign".to_string(),
            id,
        })?;
    let logs = comm_logs::list_by_campaign(&state.db, id).await?;
    Ok(Json(logs))
}
