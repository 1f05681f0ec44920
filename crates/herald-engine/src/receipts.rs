// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery receipt application.
//!
//! Receipts are the authoritative per-recipient outcome. They arrive
//! asynchronously, possibly after the campaign has been finalized, and touch
//! exactly one log row. Campaign counters are never revised from receipts;
//! aggregate and ledger may diverge permanently.

use std::str::FromStr;

use chrono::Utc;
use herald_core::types::LogStatus;
use herald_core::vendor::DeliveryReceipt;
use herald_core::HeraldError;
use herald_storage::queries::comm_logs;
use herald_storage::Database;
use tracing::debug;

use crate::recording;

/// Apply one delivery receipt to its communication log row.
///
/// The vendor status is lowercased into the log status vocabulary; a status
/// outside it is rejected as validation failure. An unknown log id is
/// `NotFound` and alters nothing.
pub async fn apply_receipt(db: &Database, receipt: &DeliveryReceipt) -> Result<(), HeraldError> {
    let status = LogStatus::from_str(&receipt.status.to_lowercase()).map_err(|_| {
        HeraldError::Validation(format!("unknown receipt status: {}", receipt.status))
    })?;
    let sent_at = receipt.delivered_at.unwrap_or_else(Utc::now);

    let updated = comm_logs::update_status(
        db,
        receipt.log_id,
        status,
        Some(sent_at),
        receipt.failure_reason.clone(),
        Some(receipt.vendor_id.clone()),
    )
    .await?;

    if !updated {
        return Err(HeraldError::NotFound {
            entity: "communication log".to_string(),
            id: receipt.log_id,
        });
    }

    recording::record_receipt();
    debug!(
        log_id = receipt.log_id,
        status = %status,
        vendor_id = receipt.vendor_id.as_str(),
        "delivery receipt applied"
    );
    Ok(())
}
