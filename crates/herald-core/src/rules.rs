// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment rule predicates.
//!
//! A rule set is a flat list of field/operator/value conditions joined by a
//! single AND or OR. Rules are stored as JSON and compiled into a closed set
//! of typed conditions before evaluation; evaluation is pure, synchronous and
//! in-memory. Condition values are always strings and are parsed per field at
//! compile time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Customer;

/// How the conditions of a rule set combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombineOp {
    #[default]
    And,
    Or,
}

/// A single raw condition as authored by the user (or an assist provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

/// A raw rule set as stored on a segment.
///
/// Parsing is tolerant: missing pieces take their defaults, and fully
/// malformed JSON degrades to the empty rule set, which matches every
/// customer rather than failing the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentRules {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub operator: CombineOp,
}

impl SegmentRules {
    /// Parses rules from stored JSON, degrading to the empty rule set on
    /// malformed input.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Comparison operator for numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
}

impl CompareOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "=" => Some(Self::Eq),
            _ => None,
        }
    }

    fn holds_f64(self, left: f64, right: f64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Gte => left >= right,
            Self::Lt => left < right,
            Self::Lte => left <= right,
            Self::Eq => left == right,
        }
    }

    fn holds_i64(self, left: i64, right: i64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Gte => left >= right,
            Self::Lt => left < right,
            Self::Lte => left <= right,
            Self::Eq => left == right,
        }
    }
}

/// A rule condition compiled into the closed evaluation set.
///
/// Combinations outside the supported set compile to [`Unsupported`] instead
/// of failing, so a stored rule set always compiles; callers decide whether
/// to surface the marker. Date cutoffs are resolved against a single clock
/// reading passed to the compiler.
///
/// [`Unsupported`]: CompiledCondition::Unsupported
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledCondition {
    /// Lifetime spend compared against a decimal threshold.
    TotalSpent { op: CompareOp, threshold: f64 },
    /// Visit count compared against an integer threshold.
    VisitCount { op: CompareOp, threshold: i64 },
    /// Last purchase strictly after the cutoff (purchased within N days).
    LastPurchaseAfter { cutoff: DateTime<Utc> },
    /// Last purchase strictly before the cutoff (no purchase for N days).
    LastPurchaseBefore { cutoff: DateTime<Utc> },
    /// Not part of the evaluation set; dropped from combination.
    Unsupported { field: String, operator: String },
}

/// Compiles one raw condition at a fixed evaluation instant.
///
/// `now` anchors relative date values ("N days ago") so that every condition
/// of a rule set sees the same clock reading.
pub fn compile_condition(condition: &Condition, now: DateTime<Utc>) -> CompiledCondition {
    let unsupported = || CompiledCondition::Unsupported {
        field: condition.field.clone(),
        operator: condition.operator.clone(),
    };

    let Some(op) = CompareOp::parse(condition.operator.trim()) else {
        return unsupported();
    };

    match condition.field.as_str() {
        "totalSpent" => match condition.value.trim().parse::<f64>() {
            Ok(threshold) => CompiledCondition::TotalSpent { op, threshold },
            Err(_) => unsupported(),
        },
        "visitCount" => match condition.value.trim().parse::<i64>() {
            Ok(threshold) => CompiledCondition::VisitCount { op, threshold },
            Err(_) => unsupported(),
        },
        "lastPurchaseDate" => {
            // Value is a day count; `>` means purchased within the window,
            // `<` means the last purchase predates it. No other operator is
            // part of the date evaluation set.
            let Ok(days) = condition.value.trim().parse::<i64>() else {
                return unsupported();
            };
            let cutoff = now - Duration::days(days);
            match op {
                CompareOp::Gt => CompiledCondition::LastPurchaseAfter { cutoff },
                CompareOp::Lt => CompiledCondition::LastPurchaseBefore { cutoff },
                _ => unsupported(),
            }
        }
        // `customerSince` can be authored but has never been part of the
        // evaluation dispatch; it lands here with every unknown field.
        _ => unsupported(),
    }
}

/// A rule set compiled for evaluation against a customer collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRules {
    pub conditions: Vec<CompiledCondition>,
    pub operator: CombineOp,
}

impl CompiledRules {
    /// Compiles every condition of `rules` against a single clock reading.
    pub fn compile(rules: &SegmentRules, now: DateTime<Utc>) -> Self {
        Self {
            conditions: rules
                .conditions
                .iter()
                .map(|c| compile_condition(c, now))
                .collect(),
            operator: rules.operator,
        }
    }

    /// The conditions that compiled to [`CompiledCondition::Unsupported`].
    pub fn unsupported(&self) -> impl Iterator<Item = &CompiledCondition> {
        self.conditions
            .iter()
            .filter(|c| matches!(c, CompiledCondition::Unsupported { .. }))
    }

    /// Evaluates the rule set against one customer.
    ///
    /// Unsupported conditions are dropped before combination. A rule set
    /// with no supported conditions applies no filter and matches every
    /// customer.
    pub fn matches(&self, customer: &Customer) -> bool {
        let mut supported = self
            .conditions
            .iter()
            .filter(|c| !matches!(c, CompiledCondition::Unsupported { .. }))
            .peekable();
        if supported.peek().is_none() {
            return true;
        }
        match self.operator {
            CombineOp::And => supported.all(|c| condition_matches(c, customer)),
            CombineOp::Or => supported.any(|c| condition_matches(c, customer)),
        }
    }
}

fn condition_matches(condition: &CompiledCondition, customer: &Customer) -> bool {
    match condition {
        CompiledCondition::TotalSpent { op, threshold } => {
            op.holds_f64(customer.total_spent, *threshold)
        }
        CompiledCondition::VisitCount { op, threshold } => {
            op.holds_i64(customer.visit_count, *threshold)
        }
        // A customer with no purchase on record matches neither side of a
        // date cutoff.
        CompiledCondition::LastPurchaseAfter { cutoff } => customer
            .last_purchase_date
            .is_some_and(|d| d > *cutoff),
        CompiledCondition::LastPurchaseBefore { cutoff } => customer
            .last_purchase_date
            .is_some_and(|d| d < *cutoff),
        CompiledCondition::Unsupported { .. } => false,
    }
}
