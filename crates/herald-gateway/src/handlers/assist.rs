// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assist endpoints.
//!
//! All three serve 503 when no assist provider is configured; the rest of
//! the gateway keeps working without one.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use herald_assist::{AssistClient, CampaignInsights, CampaignPerformance, MessageVariant};
use herald_core::rules::SegmentRules;
use herald_core::HeraldError;
use herald_storage::queries::{campaigns, segments};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /v1/assist/segment-rules.
#[derive(Debug, Deserialize)]
pub struct SegmentRulesRequest {
    pub description: String,
}

/// Request body for POST /v1/assist/messages.
#[derive(Debug, Deserialize)]
pub struct MessagesRequest {
    pub objective: String,
    pub audience: String,
}

/// Response body for POST /v1/assist/messages.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageVariant>,
}

fn client(state: &GatewayState) -> Result<Arc<AssistClient>, ApiError> {
    state.assist.clone().ok_or_else(|| {
        HeraldError::Assist {
            message: "no assist provider configured".to_string(),
            source: None,
        }
        .into()
    })
}

/// POST /v1/assist/segment-rules
pub async fn segment_rules(
    State(state): State<GatewayState>,
    Json(body): Json<SegmentRulesRequest>,
) -> Result<Json<SegmentRules>, ApiError> {
    if body.description.trim().is_empty() {
        return Err(HeraldError::Validation("description is required".into()).into());
    }
    let client = client(&state)?;
    let rules = herald_assist::generate_segment_rules(&client, &body.description).await?;
    Ok(Json(rules))
}

/// POST /v1/assist/messages
pub async fn messages(
    State(state): State<GatewayState>,
    Json(body): Json<MessagesRequest>,
) -> Result<Json<MessagesResponse>, ApiError> {
    if body.objective.trim().is_empty() || body.audience.trim().is_empty() {
        return Err(HeraldError::Validation("objective and audience are required".into()).into());
    }
    let client = client(&state)?;
    let messages =
        herald_assist::generate_campaign_messages(&client, &body.objective, &body.audience).await?;
    Ok(Json(MessagesResponse { messages }))
}

/// POST /v1/assist/campaign-insights/{id}
pub async fn campaign_insights(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<CampaignInsights>, ApiError> {
    let client = client(&state)?;
    let campaign = campaigns::get(&state.db, id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "campaign".to_string(),
            id,
        })?;
    let segment = segments::get(&state.db, campaign.segment_id)
        .await?
        .ok_or_else(|| HeraldError::NotFound {
            entity: "segment".to_string(),
            id: campaign.segment_id,
        })?;

    let performance = CampaignPerformance {
        audience_size: campaign.audience_size,
        delivered_count: campaign.delivered_count,
        failed_count: campaign.failed_count,
        success_rate: campaign.success_rate.unwrap_or(0.0),
        segment_description: segment.description.unwrap_or(segment.name),
    };
    let insights = herald_assist::generate_campaign_insights(&client, &performance).await?;
    Ok(Json(insights))
}
