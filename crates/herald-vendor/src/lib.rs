// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated delivery vendor.
//!
//! Stands in for a real message-delivery provider: each dispatch waits a
//! random latency, comes back `SENT` with the configured probability, and is
//! followed by an asynchronous delivery receipt after a further random
//! delay. Receipts are emitted through an injected channel; the serve wiring
//! drains them into the receipt handler. Business failures are part of the
//! simulation; the simulated vendor never fails at the transport level.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use herald_config::model::VendorConfig;
use herald_core::vendor::{
    DeliveryReceipt, DeliveryVendor, DispatchRequest, VendorResponse, VendorStatus,
};
use herald_core::HeraldError;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;

/// Failure reasons the simulation samples from.
const FAILURE_REASONS: &[&str] = &[
    "Invalid email address",
    "Customer unsubscribed",
    "Email bounced",
    "Rate limit exceeded",
    "Temporary server error",
];

/// Probabilistic vendor with configurable latency and receipt delay.
///
/// Ranges are inclusive and assumed ordered; config validation enforces
/// `min <= max` before construction.
pub struct SimulatedVendor {
    config: VendorConfig,
    receipt_tx: mpsc::Sender<DeliveryReceipt>,
}

impl SimulatedVendor {
    pub fn new(config: VendorConfig, receipt_tx: mpsc::Sender<DeliveryReceipt>) -> Self {
        Self { config, receipt_tx }
    }

    /// Emit the delivery receipt for a dispatch after its random delay.
    ///
    /// Spawned detached: receipts outlive the campaign run and may land
    /// after the campaign has been finalized.
    fn schedule_receipt(
        &self,
        log_id: i64,
        vendor_id: String,
        status: VendorStatus,
        failure_reason: Option<String>,
        delay: Duration,
    ) {
        let tx = self.receipt_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let receipt = DeliveryReceipt {
                log_id,
                vendor_id,
                status: status.to_string(),
                delivered_at: Some(Utc::now()),
                failure_reason,
            };
            if tx.send(receipt).await.is_err() {
                debug!(log_id, "receipt channel closed, receipt dropped");
            }
        });
    }
}

#[async_trait]
impl DeliveryVendor for SimulatedVendor {
    async fn send(&self, request: DispatchRequest) -> Result<VendorResponse, HeraldError> {
        // Draw everything up front; the rng is not held across awaits.
        let (latency, failure_reason, receipt_delay) = {
            let mut rng = rand::thread_rng();
            let latency = Duration::from_millis(
                rng.gen_range(self.config.latency_ms_min..=self.config.latency_ms_max),
            );
            let failure_reason = if rng.gen_bool(self.config.success_rate) {
                None
            } else {
                Some(FAILURE_REASONS[rng.gen_range(0..FAILURE_REASONS.len())].to_string())
            };
            let receipt_delay = Duration::from_millis(
                rng.gen_range(self.config.receipt_delay_ms_min..=self.config.receipt_delay_ms_max),
            );
            (latency, failure_reason, receipt_delay)
        };

        tokio::time::sleep(latency).await;

        let vendor_id = new_vendor_id();
        let (status, detail) = match &failure_reason {
            None => (
                VendorStatus::Sent,
                format!(
                    "Message delivered successfully to {}",
                    request.customer_email
                ),
            ),
            Some(reason) => (
                VendorStatus::Failed,
                format!("Failed to deliver message: {reason}"),
            ),
        };

        debug!(
            log_id = request.log_id,
            campaign_id = request.campaign_id,
            vendor_id = vendor_id.as_str(),
            status = %status,
            "simulated dispatch"
        );

        self.schedule_receipt(
            request.log_id,
            vendor_id.clone(),
            status,
            failure_reason,
            receipt_delay,
        );

        Ok(VendorResponse {
            vendor_id,
            status,
            detail,
        })
    }
}

/// Vendor correlation id: `vendor_<unix millis>_<9 base36 chars>`.
fn new_vendor_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("vendor_{}_{}", Utc::now().timestamp_millis(), suffix)
}
