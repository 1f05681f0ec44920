// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order ingestion.
//!
//! Inserting an order also advances the owning customer's aggregates
//! (`total_spent`, `visit_count`, `last_purchase_date`) in the same SQLite
//! transaction, so the rule engine never observes an order without its
//! aggregate effect.

use chrono::Utc;
use herald_core::types::{NewOrder, Order};
use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;

const COLUMNS: &str = "id, customer_id, amount, order_date, status, created_at";

fn row_to_order(row: &rusqlite::Row<'_>) -> Result<Order, rusqlite::Error> {
    Ok(Order {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        amount: row.get(2)?,
        order_date: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert an order and update the owning customer's aggregates atomically.
///
/// Returns `NotFound` when the customer does not exist.
pub async fn insert(db: &Database, new: &NewOrder) -> Result<Order, HeraldError> {
    let customer_id = new.customer_id;
    let new = new.clone();
    let order = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let customer_exists: bool = tx
                .query_row(
                    "SELECT 1 FROM customers WHERE id = ?1",
                    params![new.customer_id],
                    |_| Ok(true),
                )
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(false),
                    other => Err(other),
                })?;
            if !customer_exists {
                tx.commit()?;
                return Ok(None);
            }

            let now = Utc::now();
            let order_date = new.order_date.unwrap_or(now);
            let status = new.status.unwrap_or_else(|| "completed".to_string());
            tx.execute(
                "INSERT INTO orders (customer_id, amount, order_date, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![new.customer_id, new.amount, order_date, status, now],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE customers SET
                     total_spent = total_spent + ?1,
                     visit_count = visit_count + 1,
                     last_purchase_date = ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                params![new.amount, order_date, now, new.customer_id],
            )?;

            let order = tx.query_row(
                &format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"),
                params![id],
                row_to_order,
            )?;
            tx.commit()?;
            Ok(Some(order))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    order.ok_or_else(|| HeraldError::NotFound {
        entity: "customer".into(),
        id: customer_id,
    })
}

/// Orders for one customer, most recent first.
pub async fn list_by_customer(db: &Database, customer_id: i64) -> Result<Vec<Order>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM orders
                 WHERE customer_id = ?1 ORDER BY order_date DESC"
            ))?;
            let rows = stmt.query_map(params![customer_id], row_to_order)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
