// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer queries: ingestion, lookups, and the purchase aggregates the
//! rule engine evaluates against.

use chrono::Utc;
use herald_core::types::{Customer, CustomerUpdate, NewCustomer};
use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;

const COLUMNS: &str = "id, name, email, phone, total_spent, visit_count, \
                       last_purchase_date, customer_since, is_active, created_at, updated_at";

pub(crate) fn row_to_customer(row: &rusqlite::Row<'_>) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        total_spent: row.get(4)?,
        visit_count: row.get(5)?,
        last_purchase_date: row.get(6)?,
        customer_since: row.get(7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert a customer and return the stored row.
///
/// Email uniqueness is enforced by the schema; a duplicate surfaces as a
/// storage error.
pub async fn insert(db: &Database, new: &NewCustomer) -> Result<Customer, HeraldError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO customers (name, email, phone, total_spent, visit_count,
                                        last_purchase_date, customer_since, is_active,
                                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.name,
                    new.email,
                    new.phone,
                    new.total_spent,
                    new.visit_count,
                    new.last_purchase_date,
                    now,
                    new.is_active,
                    now,
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                row_to_customer,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one customer by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Customer>, HeraldError> {
    db.connection()
        .call(move |conn| {
            match conn.query_row(
                &format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                row_to_customer,
            ) {
                Ok(customer) => Ok(Some(customer)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List customers, newest first.
pub async fn list(db: &Database, limit: i64, offset: i64) -> Result<Vec<Customer>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM customers
                 ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset], row_to_customer)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every customer in insertion order.
///
/// The audience evaluator iterates this collection; its order defines the
/// delivery order of a campaign.
pub async fn list_all(db: &Database) -> Result<Vec<Customer>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM customers ORDER BY id ASC"))?;
            let rows = stmt.query_map([], row_to_customer)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of customers.
pub async fn count(db: &Database) -> Result<i64, HeraldError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update; `None` fields are left untouched.
///
/// Returns the updated row, or `None` if the customer does not exist.
pub async fn update(
    db: &Database,
    id: i64,
    update: &CustomerUpdate,
) -> Result<Option<Customer>, HeraldError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE customers SET
                     name = COALESCE(?1, name),
                     email = COALESCE(?2, email),
                     phone = COALESCE(?3, phone),
                     is_active = COALESCE(?4, is_active),
                     updated_at = ?5
                 WHERE id = ?6",
                params![update.name, update.email, update.phone, update.is_active, Utc::now(), id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                row_to_customer,
            )
            .map(Some)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
