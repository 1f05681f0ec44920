// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assist operations: natural language to segment rules, campaign message
//! variants, and campaign performance insights.
//!
//! Each operation is a single JSON-mode completion with a fixed prompt.
//! Model output is untrusted input: rules go through the same tolerant
//! parse and compile validation as user-entered rules, and the other
//! payloads deserialize with defaults for missing fields.

use herald_core::rules::{CompiledRules, SegmentRules};
use herald_core::HeraldError;
use chrono::Utc;
use tracing::warn;

use crate::client::AssistClient;
use crate::types::{CampaignInsights, CampaignPerformance, MessageVariant, MessagesEnvelope};

const RULES_SYSTEM_PROMPT: &str = "You are a CRM expert that converts natural language into \
structured database queries. Always respond with valid JSON.";

const MESSAGES_SYSTEM_PROMPT: &str = "You are a marketing expert specializing in personalized \
customer communication for Indian e-commerce businesses.";

const INSIGHTS_SYSTEM_PROMPT: &str = "You are a CRM analytics expert who provides actionable \
insights from campaign performance data.";

/// Converts a natural-language audience description into segment rules.
///
/// The returned rules are exactly what the model produced after the
/// tolerant parse; unsupported conditions are kept (they drop out at
/// evaluation time, like user-entered ones) but logged here.
pub async fn generate_segment_rules(
    client: &AssistClient,
    description: &str,
) -> Result<SegmentRules, HeraldError> {
    let prompt = format!(
        r#"Convert this natural language description into structured segment rules for a CRM system.

Description: "{description}"

Available fields:
- totalSpent (decimal amount in rupees)
- visitCount (integer number of visits)
- lastPurchaseDate (days ago as integer)

Available operators: >, >=, <, <=, =

Return JSON in this format:
{{
  "conditions": [
    {{
      "field": "totalSpent",
      "operator": ">",
      "value": "10000"
    }}
  ],
  "operator": "AND"
}}"#
    );

    let content = client.complete_json(RULES_SYSTEM_PROMPT, &prompt).await?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| HeraldError::Assist {
            message: format!("assist returned invalid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;
    let rules = SegmentRules::from_value(&value);

    let compiled = CompiledRules::compile(&rules, Utc::now());
    let dropped = compiled.unsupported().count();
    if dropped > 0 {
        warn!(dropped, "assist produced conditions outside the supported rule fields");
    }

    Ok(rules)
}

/// Generates three campaign message variants for an objective and audience.
pub async fn generate_campaign_messages(
    client: &AssistClient,
    objective: &str,
    audience: &str,
) -> Result<Vec<MessageVariant>, HeraldError> {
    let prompt = format!(
        r#"Generate 3 different marketing message variants for a campaign.

Campaign Objective: {objective}
Target Audience: {audience}

Create messages that are:
1. Personalized (use {{name}} placeholder)
2. Engaging and relevant
3. Include a clear call-to-action
4. Appropriate for the Indian market (use ₹ for currency)

Return JSON in this format:
{{
  "messages": [
    {{
      "variant": "Emotional",
      "tone": "warm and personal",
      "content": "Message content here with {{name}} placeholder"
    }},
    {{
      "variant": "Urgency",
      "tone": "urgent and compelling",
      "content": "Message content here with {{name}} placeholder"
    }},
    {{
      "variant": "Value-focused",
      "tone": "professional and benefit-driven",
      "content": "Message content here with {{name}} placeholder"
    }}
  ]
}}"#
    );

    let content = client.complete_json(MESSAGES_SYSTEM_PROMPT, &prompt).await?;
    let envelope: MessagesEnvelope =
        serde_json::from_str(&content).map_err(|e| HeraldError::Assist {
            message: format!("assist returned invalid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(envelope.messages)
}

/// Summarizes a completed campaign's delivery figures into insights.
pub async fn generate_campaign_insights(
    client: &AssistClient,
    performance: &CampaignPerformance,
) -> Result<CampaignInsights, HeraldError> {
    let prompt = format!(
        r#"Analyze this campaign performance data and provide insights:

Campaign Data:
- Audience Size: {audience_size}
- Delivered: {delivered}
- Failed: {failed}
- Success Rate: {success_rate}%
- Segment: {segment}

Provide a human-readable analysis with:
1. A summary paragraph
2. Key insights (3-4 bullet points)
3. Actionable recommendations (2-3 bullet points)

Return JSON in this format:
{{
  "summary": "Your campaign reached X users with Y% delivery rate...",
  "insights": [
    "Insight 1",
    "Insight 2"
  ],
  "recommendations": [
    "Recommendation 1",
    "Recommendation 2"
  ]
}}"#,
        audience_size = performance.audience_size,
        delivered = performance.delivered_count,
        failed = performance.failed_count,
        success_rate = performance.success_rate,
        segment = performance.segment_description,
    );

    let content = client.complete_json(INSIGHTS_SYSTEM_PROMPT, &prompt).await?;
    serde_json::from_str(&content).map_err(|e| HeraldError::Assist {
        message: format!("assist returned invalid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}
