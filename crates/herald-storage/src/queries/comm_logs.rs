// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-recipient communication log queries.
//!
//! One row per (campaign, customer) dispatch attempt. Rows are created
//! `pending` before the vendor call; `update_status` is the single writer
//! for every later transition, whether from the delivery run (eager
//! transport failure) or from a delivery receipt.

use chrono::{DateTime, Utc};
use herald_core::types::{CommunicationLog, LogStatus};
use herald_core::HeraldError;
use rusqlite::params;
use std::str::FromStr;

use crate::database::Database;

const COLUMNS: &str =
    "id, campaign_id, customer_id, message, status, sent_at, failure_reason, vendor_id, created_at";

fn row_to_log(row: &rusqlite::Row<'_>) -> Result<CommunicationLog, rusqlite::Error> {
    let status: String = row.get(4)?;
    Ok(CommunicationLog {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        customer_id: row.get(2)?,
        message: row.get(3)?,
        status: LogStatus::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        sent_at: row.get(5)?,
        failure_reason: row.get(6)?,
        vendor_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Create a `pending` log row for one recipient and return it.
pub async fn insert_pending(
    db: &Database,
    campaign_id: i64,
    customer_id: i64,
    message: &str,
) -> Result<CommunicationLog, HeraldError> {
    let message = message.to_string();
    db.connection()
        .call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO communication_logs (campaign_id, customer_id, message, status, created_at)
                 VALUES (?1, ?2, ?3, 'pending', ?4)",
                params![campaign_id, customer_id, message, now],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM communication_logs WHERE id = ?1"),
                params![id],
                row_to_log,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one log row by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<CommunicationLog>, HeraldError> {
    db.connection()
        .call(move |conn| {
            match conn.query_row(
                &format!("SELECT {COLUMNS} FROM communication_logs WHERE id = ?1"),
                params![id],
                row_to_log,
            ) {
                Ok(log) => Ok(Some(log)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a campaign's log rows, newest first.
pub async fn list_by_campaign(
    db: &Database,
    campaign_id: i64,
) -> Result<Vec<CommunicationLog>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM communication_logs
                 WHERE campaign_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![campaign_id], row_to_log)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a log row's status. Optional fields are written only when
/// provided; `None` leaves the stored value untouched.
///
/// Returns `false` when no row matched the id.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: LogStatus,
    sent_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
    vendor_id: Option<String>,
) -> Result<bool, HeraldError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE communication_logs SET
                     status = ?1,
                     sent_at = COALESCE(?2, sent_at),
                     failure_reason = COALESCE(?3, failure_reason),
                     vendor_id = COALESCE(?4, vendor_id)
                 WHERE id = ?5",
                params![status, sent_at, failure_reason, vendor_id, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{campaigns, customers, segments};
    use herald_core::rules::SegmentRules;
    use herald_core::types::{NewCampaign, NewCustomer, NewSegment};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed(db: &Database) -> (i64, i64) {
        let customer = customers::insert(
            db,
            &NewCustomer {
                name: "Priya Sharma".into(),
                email: "priya@example.com".into(),
                phone: None,
                total_spent: 1200.0,
                visit_count: 3,
                last_purchase_date: None,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let segment = segments::insert(
            db,
            &NewSegment {
                name: "Everyone".into(),
                description: None,
                rules: SegmentRules::default(),
                created_by: None,
            },
            0,
        )
        .await
        .unwrap();

        let campaign = campaigns::insert(
            db,
            &NewCampaign {
                name: "Welcome back".into(),
                segment_id: segment.id,
                message: "Hi {name}!".into(),
                created_by: None,
            },
        )
        .await
        .unwrap();

        (campaign.id, customer.id)
    }

    #[tokio::test]
    async fn pending_row_then_receipt_marks_sent() {
        let (db, _dir) = setup_db().await;
        let (campaign_id, customer_id) = seed(&db).await;

        let log = insert_pending(&db, campaign_id, customer_id, "Hi Priya Sharma!")
            .await
            .unwrap();
        assert_eq!(log.status, LogStatus::Pending);
        assert!(log.sent_at.is_none());
        assert!(log.vendor_id.is_none());

        let changed = update_status(
            &db,
            log.id,
            LogStatus::Sent,
            Some(Utc::now()),
            None,
            Some("vendor_1756100000_abc123xyz".into()),
        )
        .await
        .unwrap();
        assert!(changed);

        let stored = get(&db, log.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LogStatus::Sent);
        assert!(stored.sent_at.is_some());
        assert_eq!(
            stored.vendor_id.as_deref(),
            Some("vendor_1756100000_abc123xyz")
        );
        assert!(stored.failure_reason.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_writes_only_provided_fields() {
        let (db, _dir) = setup_db().await;
        let (campaign_id, customer_id) = seed(&db).await;

        let log = insert_pending(&db, campaign_id, customer_id, "Hi Priya Sharma!")
            .await
            .unwrap();
        update_status(
            &db,
            log.id,
            LogStatus::Failed,
            None,
            Some("vendor error".into()),
            None,
        )
        .await
        .unwrap();

        // None left sent_at and vendor_id at their stored values.
        let stored = get(&db, log.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LogStatus::Failed);
        assert!(stored.sent_at.is_none());
        assert_eq!(stored.failure_reason.as_deref(), Some("vendor error"));
        assert!(stored.vendor_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_unknown_log_matches_no_rows() {
        let (db, _dir) = setup_db().await;

        let changed = update_status(&db, 9999, LogStatus::Sent, Some(Utc::now()), None, None)
            .await
            .unwrap();
        assert!(!changed);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_scoped_to_campaign() {
        let (db, _dir) = setup_db().await;
        let (campaign_id, customer_id) = seed(&db).await;

        let other = campaigns::insert(
            &db,
            &NewCampaign {
                name: "Other".into(),
                segment_id: 1,
                message: "m".into(),
                created_by: None,
            },
        )
        .await
        .unwrap();

        insert_pending(&db, campaign_id, customer_id, "a").await.unwrap();
        insert_pending(&db, campaign_id, customer_id, "b").await.unwrap();
        insert_pending(&db, other.id, customer_id, "c").await.unwrap();

        let logs = list_by_campaign(&db, campaign_id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.campaign_id == campaign_id));

        db.close().await.unwrap();
    }
}
