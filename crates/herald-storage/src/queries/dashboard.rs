// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate counters for the dashboard endpoint.

use herald_core::HeraldError;

use crate::database::Database;
use crate::models::DashboardStats;

/// Compute the dashboard aggregates in one connection round-trip.
///
/// `avg_delivery_rate` averages the stored success rates of finalized
/// campaigns; with no finalized campaign it is 0.
pub async fn stats(db: &Database) -> Result<DashboardStats, HeraldError> {
    db.connection()
        .call(move |conn| {
            let total_customers: i64 =
                conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
            let active_campaigns: i64 = conn.query_row(
                "SELECT COUNT(*) FROM campaigns WHERE status = 'active'",
                [],
                |row| row.get(0),
            )?;
            let avg_delivery_rate: f64 = conn.query_row(
                "SELECT COALESCE(AVG(success_rate), 0) FROM campaigns
                 WHERE success_rate IS NOT NULL",
                [],
                |row| row.get(0),
            )?;
            let total_revenue: f64 = conn.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM orders",
                [],
                |row| row.get(0),
            )?;
            Ok(DashboardStats {
                total_customers,
                active_campaigns,
                avg_delivery_rate,
                total_revenue,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}
