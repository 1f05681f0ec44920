// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery vendor contract.
//!
//! The vendor is injected into the delivery engine as a trait object so the
//! simulated vendor, a real integration, or a scripted test double can stand
//! behind the same seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::HeraldError;

/// One outbound message handed to the delivery vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Communication-log row this dispatch belongs to; receipts correlate
    /// back through it.
    pub log_id: i64,
    pub campaign_id: i64,
    pub customer_email: String,
    pub customer_name: String,
    /// Fully rendered message, placeholders already substituted.
    pub message: String,
}

/// Immediate business outcome reported by the vendor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VendorStatus {
    Sent,
    Failed,
}

/// Synchronous response from [`DeliveryVendor::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct VendorResponse {
    /// Vendor-assigned correlation id for this dispatch.
    pub vendor_id: String,
    pub status: VendorStatus,
    /// Human-readable outcome line, e.g. the failure reason.
    pub detail: String,
}

/// Asynchronous delivery receipt the vendor reports after the fact.
///
/// The receipt is authoritative for the per-recipient ledger; its status may
/// disagree with the immediate response and may arrive after the campaign
/// has already been finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub log_id: i64,
    pub vendor_id: String,
    /// Raw vendor status string; normalized to lowercase when applied.
    pub status: String,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Outbound message delivery seam.
///
/// `Ok` covers every response the vendor produced, business failures
/// included; `Err` means the request itself could not be made and no vendor
/// outcome exists.
#[async_trait]
pub trait DeliveryVendor: Send + Sync {
    async fn send(&self, request: DispatchRequest) -> Result<VendorResponse, HeraldError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn vendor_status_uses_uppercase_wire_form() {
        assert_eq!(VendorStatus::Sent.to_string(), "SENT");
        assert_eq!(VendorStatus::from_str("FAILED").unwrap(), VendorStatus::Failed);
        let json = serde_json::to_string(&VendorStatus::Sent).unwrap();
        assert_eq!(json, "\"SENT\"");
    }

    #[test]
    fn receipt_tolerates_missing_optional_fields() {
        let receipt: DeliveryReceipt = serde_json::from_str(
            r#"{"log_id": 7, "vendor_id": "vendor_1_abc", "status": "SENT"}"#,
        )
        .unwrap();
        assert_eq!(receipt.log_id, 7);
        assert!(receipt.delivered_at.is_none());
        assert!(receipt.failure_reason.is_none());
    }
}
