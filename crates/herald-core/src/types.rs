// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entity types shared across the herald workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::rules::SegmentRules;

/// A customer record, including the purchase aggregates the rule engine
/// evaluates against.
///
/// `total_spent`, `visit_count` and `last_purchase_date` are derived
/// aggregates: order ingestion updates them atomically with the order
/// insert, and nothing else writes them apart from explicit updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub total_spent: f64,
    pub visit_count: i64,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub customer_since: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a customer via ingestion.
///
/// Aggregates may be supplied up front (bulk imports, seeding); they
/// default to a fresh customer with no purchase history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub visit_count: i64,
    #[serde(default)]
    pub last_purchase_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Partial customer update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// An immutable order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for ingesting an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A saved audience segment.
///
/// `audience_size` is a snapshot taken when the segment was created; the
/// live audience is always re-evaluated at delivery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub rules: SegmentRules,
    pub audience_size: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSegment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rules: SegmentRules,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Campaign lifecycle state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
    Failed,
}

/// An outbound campaign against a segment's audience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub segment_id: i64,
    /// Message template; every `{name}` occurrence is replaced with the
    /// recipient's name at dispatch time.
    pub message: String,
    pub status: CampaignStatus,
    pub audience_size: i64,
    pub delivered_count: i64,
    pub failed_count: i64,
    /// Percentage with two-decimal precision, set at finalization.
    pub success_rate: Option<f64>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload for creating a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub segment_id: i64,
    pub message: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Per-recipient delivery ledger state.
///
/// Transitions are strict: `pending` moves to exactly one of `sent` or
/// `failed`, and never back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Pending,
    Sent,
    Failed,
}

/// One row of the per-recipient communication ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationLog {
    pub id: i64,
    pub campaign_id: i64,
    pub customer_id: i64,
    /// The rendered message as dispatched, not the template.
    pub message: String,
    pub status: LogStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    /// Vendor-assigned correlation id, recorded when a receipt arrives.
    pub vendor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
