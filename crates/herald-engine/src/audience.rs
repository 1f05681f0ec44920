// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audience materialization.
//!
//! An audience is computed live: load the full customer collection, compile
//! the segment's rules against the current clock, and keep the customers the
//! rules match. Iteration order is storage insertion order (ascending id),
//! which fixes the delivery order of a campaign run.

use chrono::Utc;
use herald_core::rules::{CompiledCondition, CompiledRules, SegmentRules};
use herald_core::types::Customer;
use herald_core::HeraldError;
use herald_storage::queries::customers;
use herald_storage::Database;
use tracing::warn;

/// Resolve the customers matching a rule set, in insertion order.
///
/// Unsupported conditions are dropped from evaluation; each one is logged
/// once per resolution so silently-ignored rules stay visible.
pub async fn resolve_audience(
    db: &Database,
    rules: &SegmentRules,
) -> Result<Vec<Customer>, HeraldError> {
    let compiled = CompiledRules::compile(rules, Utc::now());
    for condition in compiled.unsupported() {
        if let CompiledCondition::Unsupported { field, operator } = condition {
            warn!(
                field = field.as_str(),
                operator = operator.as_str(),
                "segment condition not supported, dropped from evaluation"
            );
        }
    }

    let all = customers::list_all(db).await?;
    Ok(all.into_iter().filter(|c| compiled.matches(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::rules::{CombineOp, Condition};
    use herald_core::types::NewCustomer;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_customer(db: &Database, name: &str, email: &str, spent: f64, visits: i64) {
        customers::insert(
            db,
            &NewCustomer {
                name: name.into(),
                email: email.into(),
                phone: None,
                total_spent: spent,
                visit_count: visits,
                last_purchase_date: None,
                is_active: true,
            },
        )
        .await
        .unwrap();
    }

    fn rules(conditions: Vec<(&str, &str, &str)>, operator: CombineOp) -> SegmentRules {
        SegmentRules {
            conditions: conditions
                .into_iter()
                .map(|(field, op, value)| Condition {
                    field: field.into(),
                    operator: op.into(),
                    value: value.into(),
                })
                .collect(),
            operator,
        }
    }

    #[tokio::test]
    async fn filters_by_compiled_rules() {
        let (db, _dir) = setup_db().await;
        seed_customer(&db, "Priya", "priya@example.com", 15000.0, 12).await;
        seed_customer(&db, "Rahul", "rahul@example.com", 300.0, 2).await;
        seed_customer(&db, "Sneha", "sneha@example.com", 9000.0, 8).await;

        let audience = resolve_audience(
            &db,
            &rules(vec![("totalSpent", ">", "5000")], CombineOp::And),
        )
        .await
        .unwrap();

        let names: Vec<_> = audience.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Priya", "Sneha"]);
    }

    #[tokio::test]
    async fn empty_rules_match_everyone_in_insertion_order() {
        let (db, _dir) = setup_db().await;
        seed_customer(&db, "Priya", "priya@example.com", 15000.0, 12).await;
        seed_customer(&db, "Rahul", "rahul@example.com", 300.0, 2).await;

        let audience = resolve_audience(&db, &SegmentRules::default()).await.unwrap();
        let names: Vec<_> = audience.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Priya", "Rahul"]);
    }

    #[tokio::test]
    async fn unsupported_conditions_apply_no_filter() {
        let (db, _dir) = setup_db().await;
        seed_customer(&db, "Priya", "priya@example.com", 15000.0, 12).await;
        seed_customer(&db, "Rahul", "rahul@example.com", 300.0, 2).await;

        // customerSince is declared but not wired; alone it must not filter.
        let audience = resolve_audience(
            &db,
            &rules(vec![("customerSince", ">", "90")], CombineOp::And),
        )
        .await
        .unwrap();
        assert_eq!(audience.len(), 2);
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let (db, _dir) = setup_db().await;
        seed_customer(&db, "Priya", "priya@example.com", 15000.0, 12).await;
        seed_customer(&db, "Rahul", "rahul@example.com", 300.0, 2).await;
        seed_customer(&db, "Sneha", "sneha@example.com", 9000.0, 8).await;

        let rule_set = rules(vec![("visitCount", ">=", "8")], CombineOp::And);
        let first = resolve_audience(&db, &rule_set).await.unwrap();
        let second = resolve_audience(&db, &rule_set).await.unwrap();
        assert_eq!(first, second);
    }
}
