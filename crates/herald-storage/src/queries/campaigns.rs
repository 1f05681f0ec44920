// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign queries and lifecycle transitions.
//!
//! A campaign is created `draft`, marked `active` when a delivery run picks
//! it up, and ends in exactly one of `completed` or `failed`. The targeted
//! update functions below are the only writers of those transitions.

use chrono::{DateTime, Utc};
use herald_core::types::{Campaign, CampaignStatus, NewCampaign};
use herald_core::HeraldError;
use rusqlite::params;
use std::str::FromStr;

use crate::database::Database;

const COLUMNS: &str = "id, name, segment_id, message, status, audience_size, delivered_count, \
                       failed_count, success_rate, created_by, created_at, completed_at";

fn row_to_campaign(row: &rusqlite::Row<'_>) -> Result<Campaign, rusqlite::Error> {
    let status: String = row.get(4)?;
    Ok(Campaign {
        id: row.get(0)?,
        name: row.get(1)?,
        segment_id: row.get(2)?,
        message: row.get(3)?,
        status: CampaignStatus::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        audience_size: row.get(5)?,
        delivered_count: row.get(6)?,
        failed_count: row.get(7)?,
        success_rate: row.get(8)?,
        created_by: row.get(9)?,
        created_at: row.get(10)?,
        completed_at: row.get(11)?,
    })
}

/// Insert a campaign in `draft` state and return the stored row.
pub async fn insert(db: &Database, new: &NewCampaign) -> Result<Campaign, HeraldError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO campaigns (name, segment_id, message, status, created_by, created_at)
                 VALUES (?1, ?2, ?3, 'draft', ?4, ?5)",
                params![new.name, new.segment_id, new.message, new.created_by, now],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id],
                row_to_campaign,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one campaign by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Campaign>, HeraldError> {
    db.connection()
        .call(move |conn| {
            match conn.query_row(
                &format!("SELECT {COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id],
                row_to_campaign,
            ) {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all campaigns, newest first.
pub async fn list(db: &Database) -> Result<Vec<Campaign>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM campaigns ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], row_to_campaign)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a campaign to `active` and record the audience size the
/// delivery run evaluated.
pub async fn mark_active(db: &Database, id: i64, audience_size: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE campaigns SET status = 'active', audience_size = ?1 WHERE id = ?2",
                params![audience_size, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Finalize a completed campaign: counters, success rate, `completed` status
/// and completion timestamp in one atomic update.
pub async fn finalize(
    db: &Database,
    id: i64,
    delivered_count: i64,
    failed_count: i64,
    success_rate: f64,
    completed_at: DateTime<Utc>,
) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE campaigns SET delivered_count = ?1, failed_count = ?2,
                     success_rate = ?3, status = 'completed', completed_at = ?4
                 WHERE id = ?5",
                params![delivered_count, failed_count, success_rate, completed_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a campaign to terminal `failed`.
pub async fn mark_failed(db: &Database, id: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE campaigns SET status = 'failed' WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fail every campaign still in `active` state.
///
/// Run at startup before any worker polls: `active` with no run in flight
/// means a previous process died mid-delivery, and the run is not resumed.
/// Returns the number of campaigns marked.
pub async fn fail_interrupted(db: &Database) -> Result<usize, HeraldError> {
    db.connection()
        .call(|conn| {
            let marked = conn.execute("UPDATE campaigns SET status = 'failed' WHERE status = 'active'", [])?;
            Ok(marked)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
