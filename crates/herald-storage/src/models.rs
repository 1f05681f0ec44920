// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-internal model types.
//!
//! Domain entities live in `herald-core::types`; this module holds the types
//! that only exist at the storage boundary: queue entries and aggregate query
//! results.

use serde::{Deserialize, Serialize};

/// One row of the delivery job queue.
///
/// Queue timestamps stay as the RFC 3339 strings SQLite generated; nothing
/// does date math on them.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// Aggregate counters for the dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub active_campaigns: i64,
    /// Mean success rate over finalized campaigns, 0 when none exist.
    pub avg_delivery_rate: f64,
    pub total_revenue: f64,
}
