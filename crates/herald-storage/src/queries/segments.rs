// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment queries.
//!
//! Rules are stored as JSON text. Reading is tolerant: rows with malformed
//! rules deserialize to the empty rule set instead of failing the query, so
//! one bad row cannot take down listing or delivery.

use chrono::Utc;
use herald_core::rules::SegmentRules;
use herald_core::types::{NewSegment, Segment};
use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;

const COLUMNS: &str =
    "id, name, description, rules, audience_size, created_by, created_at, updated_at";

fn row_to_segment(row: &rusqlite::Row<'_>) -> Result<Segment, rusqlite::Error> {
    let raw_rules: String = row.get(3)?;
    Ok(Segment {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        rules: serde_json::from_str(&raw_rules).unwrap_or_default(),
        audience_size: row.get(4)?,
        created_by: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a segment with its audience-size snapshot and return the stored row.
pub async fn insert(
    db: &Database,
    new: &NewSegment,
    audience_size: i64,
) -> Result<Segment, HeraldError> {
    let rules_json =
        serde_json::to_string(&new.rules).map_err(|e| HeraldError::Internal(e.to_string()))?;
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO segments (name, description, rules, audience_size, created_by,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.name,
                    new.description,
                    rules_json,
                    audience_size,
                    new.created_by,
                    now,
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM segments WHERE id = ?1"),
                params![id],
                row_to_segment,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one segment by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Segment>, HeraldError> {
    db.connection()
        .call(move |conn| {
            match conn.query_row(
                &format!("SELECT {COLUMNS} FROM segments WHERE id = ?1"),
                params![id],
                row_to_segment,
            ) {
                Ok(segment) => Ok(Some(segment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all segments, newest first.
pub async fn list(db: &Database) -> Result<Vec<Segment>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM segments ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], row_to_segment)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
