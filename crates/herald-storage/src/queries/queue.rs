// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations backing asynchronous campaign delivery.
//!
//! Delivery jobs are enqueued when a campaign is created and picked up by
//! the delivery worker. With the schema default of `max_attempts = 1` a
//! failed job goes straight to terminal `failed`; campaigns are never
//! silently re-run.

use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;
use crate::models::QueueEntry;

const COLUMNS: &str = "id, queue_name, payload, status, attempts, max_attempts,
                       created_at, updated_at, locked_until";

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    Ok(QueueEntry {
        id: row.get(0)?,
        queue_name: row.get(1)?,
        payload: row.get(2)?,
        status: row.get(3)?,
        attempts: row.get(4)?,
        max_attempts: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        locked_until: row.get(8)?,
    })
}

/// Enqueue a job. Returns the auto-generated queue entry ID.
pub async fn enqueue(db: &Database, queue_name: &str, payload: &str) -> Result<i64, HeraldError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO queue (queue_name, payload) VALUES (?1, ?2)",
                params![queue_name, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Dequeue the next pending job from the named queue.
///
/// Atomically claims the oldest pending entry, marking it `processing` with
/// a 5-minute lock timeout. Returns `None` when nothing is pending.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<QueueEntry>, HeraldError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            // Find + claim must be one transaction so two pollers never
            // grab the same job.
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {COLUMNS} FROM queue
                     WHERE queue_name = ?1 AND status = 'pending'
                     ORDER BY id ASC
                     LIMIT 1"
                ))?;
                stmt.query_row(params![queue_name], row_to_entry)
            };

            match result {
                Ok(entry) => {
                    tx.execute(
                        "UPDATE queue SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![entry.id],
                    )?;
                    tx.commit()?;

                    Ok(Some(QueueEntry {
                        status: "processing".to_string(),
                        ..entry
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Acknowledge successful processing: marks the entry `completed`.
pub async fn ack(db: &Database, id: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fail every entry still claimed as `processing`.
///
/// Run at startup before any worker polls: a crash between claim and ack
/// leaves entries in `processing` that no worker will ever revisit, and a
/// half-delivered campaign must not be silently re-run. Returns the number
/// of entries marked.
pub async fn fail_abandoned(db: &Database, queue_name: &str) -> Result<usize, HeraldError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            let marked = conn.execute(
                "UPDATE queue SET status = 'failed', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE queue_name = ?1 AND status = 'processing'",
                params![queue_name],
            )?;
            Ok(marked)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a failed processing attempt.
///
/// Increments `attempts`; the entry goes terminal `failed` once attempts
/// reach `max_attempts`, otherwise back to `pending` with the lock cleared.
pub async fn fail(db: &Database, id: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET
                     attempts = attempts + 1,
                     status = CASE WHEN attempts + 1 >= max_attempts
                              THEN 'failed' ELSE 'pending' END,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const QUEUE: &str = "campaign_delivery";

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn entry_state(db: &Database, id: i64) -> (String, i32) {
        db.connection()
            .call(move |conn| -> Result<(String, i32), rusqlite::Error> {
                conn.query_row(
                    "SELECT status, attempts FROM queue WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn enqueue_and_dequeue_lifecycle() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, QUEUE, r#"{"campaign_id":42}"#).await.unwrap();
        assert!(id > 0);

        let entry = dequeue(&db, QUEUE).await.unwrap().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.status, "processing");
        assert_eq!(entry.queue_name, QUEUE);
        assert_eq!(entry.payload, r#"{"campaign_id":42}"#);
        assert_eq!(entry.max_attempts, 1);

        // Nothing pending remains.
        let next = dequeue(&db, QUEUE).await.unwrap();
        assert!(next.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn jobs_are_claimed_in_fifo_order() {
        let (db, _dir) = setup_db().await;

        let first = enqueue(&db, QUEUE, r#"{"campaign_id":1}"#).await.unwrap();
        let second = enqueue(&db, QUEUE, r#"{"campaign_id":2}"#).await.unwrap();

        assert_eq!(dequeue(&db, QUEUE).await.unwrap().unwrap().id, first);
        assert_eq!(dequeue(&db, QUEUE).await.unwrap().unwrap().id, second);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_marks_completed() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, QUEUE, r#"{"campaign_id":7}"#).await.unwrap();
        let _entry = dequeue(&db, QUEUE).await.unwrap().unwrap();

        ack(&db, id).await.unwrap();

        let (status, _) = entry_state(&db, id).await;
        assert_eq!(status, "completed");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_is_terminal_at_default_single_attempt() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, QUEUE, r#"{"campaign_id":9}"#).await.unwrap();
        let _entry = dequeue(&db, QUEUE).await.unwrap().unwrap();

        fail(&db, id).await.unwrap();

        let (status, attempts) = entry_state(&db, id).await;
        assert_eq!(status, "failed");
        assert_eq!(attempts, 1);

        // Terminal: the job never becomes pending again.
        let next = dequeue(&db, QUEUE).await.unwrap();
        assert!(next.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_empty_queue_returns_none() {
        let (db, _dir) = setup_db().await;
        let result = dequeue(&db, "no_such_queue").await.unwrap();
        assert!(result.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_abandoned_marks_only_processing_entries() {
        let (db, _dir) = setup_db().await;

        let stuck = enqueue(&db, QUEUE, r#"{"campaign_id":1}"#).await.unwrap();
        let _claimed = dequeue(&db, QUEUE).await.unwrap().unwrap();
        let fresh = enqueue(&db, QUEUE, r#"{"campaign_id":2}"#).await.unwrap();

        let marked = fail_abandoned(&db, QUEUE).await.unwrap();
        assert_eq!(marked, 1);

        let (status, _) = entry_state(&db, stuck).await;
        assert_eq!(status, "failed");
        // The pending entry is untouched and still claimable.
        assert_eq!(dequeue(&db, QUEUE).await.unwrap().unwrap().id, fresh);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_writers_no_sqlite_busy() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // 10 tasks writing through the same Database at once.
        let mut handles = Vec::new();
        for i in 0..10 {
            let conn = db.connection().clone();
            let handle = tokio::spawn(async move {
                conn.call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        "INSERT INTO queue (queue_name, payload) VALUES (?1, ?2)",
                        params![QUEUE, format!(r#"{{"campaign_id":{i}}}"#)],
                    )?;
                    Ok(())
                })
                .await
            });
            handles.push(handle);
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "concurrent write failed: {result:?}");
        }

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 10);

        db.close().await.unwrap();
    }
}
