// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald seed` command implementation.
//!
//! Inserts a fixed roster of sample customers and orders through the normal
//! storage layer, so the aggregate invariants hold for the seeded rows too.
//! Purchase dates are offsets from now, keeping recency-based segment rules
//! meaningful no matter when the seed runs.

use chrono::{Duration, Utc};
use herald_config::model::HeraldConfig;
use herald_core::types::{NewCustomer, NewOrder};
use herald_core::HeraldError;
use herald_storage::queries::{customers, orders};
use herald_storage::Database;

struct SeedCustomer {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    /// Lifetime spend predating the seeded orders; the order inserts advance
    /// it to the customer's final total.
    base_spent: f64,
    base_visits: i64,
}

/// `(customer index, amount, days ago)`, oldest order first per customer so
/// the aggregate `last_purchase_date` lands on the newest one.
struct SeedOrder(usize, f64, i64);

const CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer {
        name: "Rahul Sharma",
        email: "rahul.sharma@email.com",
        phone: "+91-9876543210",
        base_spent: 10700.0,
        base_visits: 6,
    },
    SeedCustomer {
        name: "Priya Patel",
        email: "priya.patel@email.com",
        phone: "+91-9876543211",
        base_spent: 19000.0,
        base_visits: 13,
    },
    SeedCustomer {
        name: "Amit Kumar",
        email: "amit.kumar@email.com",
        phone: "+91-9876543212",
        base_spent: 4300.0,
        base_visits: 3,
    },
    SeedCustomer {
        name: "Sneha Reddy",
        email: "sneha.reddy@email.com",
        phone: "+91-9876543213",
        base_spent: 22700.0,
        base_visits: 20,
    },
    SeedCustomer {
        name: "Vikram Singh",
        email: "vikram.singh@email.com",
        phone: "+91-9876543214",
        base_spent: 3300.0,
        base_visits: 1,
    },
    SeedCustomer {
        name: "Anita Gupta",
        email: "anita.gupta@email.com",
        phone: "+91-9876543215",
        base_spent: 15150.0,
        base_visits: 11,
    },
    SeedCustomer {
        name: "Raj Mehta",
        email: "raj.mehta@email.com",
        phone: "+91-9876543216",
        base_spent: 29400.0,
        base_visits: 33,
    },
    SeedCustomer {
        name: "Kavita Joshi",
        email: "kavita.joshi@email.com",
        phone: "+91-9876543217",
        base_spent: 7500.0,
        base_visits: 6,
    },
    SeedCustomer {
        name: "Deepak Agarwal",
        email: "deepak.agarwal@email.com",
        phone: "+91-9876543218",
        base_spent: 21700.0,
        base_visits: 16,
    },
    SeedCustomer {
        name: "Ritu Sharma",
        email: "ritu.sharma@email.com",
        phone: "+91-9876543219",
        base_spent: 0.0,
        base_visits: 0,
    },
];

const ORDERS: &[SeedOrder] = &[
    SeedOrder(0, 1800.0, 51),
    SeedOrder(0, 2500.0, 25),
    SeedOrder(1, 2800.0, 25),
    SeedOrder(1, 3200.0, 9),
    SeedOrder(2, 4200.0, 66),
    SeedOrder(3, 3800.0, 15),
    SeedOrder(3, 5500.0, 0),
    SeedOrder(4, 2200.0, 107),
    SeedOrder(5, 3600.0, 12),
    SeedOrder(6, 6700.0, 22),
    SeedOrder(6, 8900.0, 5),
    SeedOrder(7, 4800.0, 86),
    SeedOrder(8, 7200.0, 20),
    SeedOrder(9, 3200.0, 181),
];

/// Runs the `herald seed` command.
///
/// A non-empty customer table is left untouched; seeding is not a merge.
pub async fn run_seed(config: HeraldConfig) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage.database_path).await?;

    let existing = customers::count(&db).await?;
    if existing > 0 {
        println!("herald seed: database already contains {existing} customers, nothing to do");
        return Ok(());
    }

    let inserted = seed(&db).await?;
    println!(
        "herald seed: created {} customers and {} orders in {}",
        inserted,
        ORDERS.len(),
        config.storage.database_path
    );
    Ok(())
}

/// Insert the roster and return the number of customers created.
async fn seed(db: &Database) -> Result<usize, HeraldError> {
    let now = Utc::now();

    let mut ids = Vec::with_capacity(CUSTOMERS.len());
    for customer in CUSTOMERS {
        let row = customers::insert(
            db,
            &NewCustomer {
                name: customer.name.to_string(),
                email: customer.email.to_string(),
                phone: Some(customer.phone.to_string()),
                total_spent: customer.base_spent,
                visit_count: customer.base_visits,
                last_purchase_date: None,
                is_active: true,
            },
        )
        .await?;
        ids.push(row.id);
    }

    for &SeedOrder(index, amount, days_ago) in ORDERS {
        orders::insert(
            db,
            &NewOrder {
                customer_id: ids[index],
                amount,
                order_date: Some(now - Duration::days(days_ago)),
                status: None,
            },
        )
        .await?;
    }

    Ok(ids.len())
}
