// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery vendor for deterministic testing.
//!
//! `MockVendor` implements `DeliveryVendor` with pre-scripted outcomes,
//! enabling fast, CI-runnable tests without probabilistic simulation.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use herald_core::vendor::{
    DeliveryReceipt, DeliveryVendor, DispatchRequest, VendorResponse, VendorStatus,
};
use herald_core::HeraldError;
use tokio::sync::{mpsc, Mutex};

/// Outcome of one scripted dispatch.
#[derive(Debug, Clone)]
pub enum VendorOutcome {
    /// The vendor accepts the dispatch; its receipt carries `SENT`.
    Sent,
    /// The vendor rejects the dispatch; its receipt carries `FAILED`
    /// with this reason.
    Failed(String),
    /// The vendor call itself errors; no response and no receipt exist.
    TransportError,
}

/// A mock delivery vendor that returns pre-scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, the
/// fallback outcome repeats. Every dispatch is recorded for assertions.
/// With a receipt channel attached, the matching receipt is sent
/// synchronously inside `send`, so receipts are fully buffered by the
/// time a campaign run returns.
pub struct MockVendor {
    script: Mutex<VecDeque<VendorOutcome>>,
    fallback: VendorOutcome,
    requests: Mutex<Vec<DispatchRequest>>,
    receipt_tx: Option<mpsc::Sender<DeliveryReceipt>>,
}

impl MockVendor {
    /// Create a mock vendor that answers every dispatch with one outcome.
    pub fn always(fallback: VendorOutcome) -> Self {
        Self::with_script(Vec::new(), fallback)
    }

    /// Create a mock vendor that walks the script, then repeats the
    /// fallback.
    pub fn with_script(script: Vec<VendorOutcome>, fallback: VendorOutcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            fallback,
            requests: Mutex::new(Vec::new()),
            receipt_tx: None,
        }
    }

    /// Attach a receipt channel; one receipt per vendor response.
    pub fn emit_receipts(mut self, tx: mpsc::Sender<DeliveryReceipt>) -> Self {
        self.receipt_tx = Some(tx);
        self
    }

    /// Add an outcome to the end of the script.
    pub async fn push_outcome(&self, outcome: VendorOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Snapshot of every dispatch seen so far, in order.
    pub async fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().await.clone()
    }

    /// Pop the next outcome, or fall back.
    async fn next_outcome(&self) -> VendorOutcome {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl DeliveryVendor for MockVendor {
    async fn send(&self, request: DispatchRequest) -> Result<VendorResponse, HeraldError> {
        let log_id = request.log_id;
        self.requests.lock().await.push(request);

        let (status, detail, failure_reason) = match self.next_outcome().await {
            VendorOutcome::Sent => (VendorStatus::Sent, "delivered".to_string(), None),
            VendorOutcome::Failed(reason) => {
                (VendorStatus::Failed, reason.clone(), Some(reason))
            }
            VendorOutcome::TransportError => {
                return Err(HeraldError::Vendor {
                    message: "scripted transport error".to_string(),
                    source: None,
                });
            }
        };

        let vendor_id = format!("mock_{log_id}");
        if let Some(tx) = &self.receipt_tx {
            let receipt = DeliveryReceipt {
                log_id,
                vendor_id: vendor_id.clone(),
                status: status.to_string(),
                delivered_at: Some(Utc::now()),
                failure_reason,
            };
            if tx.send(receipt).await.is_err() {
                tracing::debug!(log_id, "receipt channel closed, receipt dropped");
            }
        }

        Ok(VendorResponse {
            vendor_id,
            status,
            detail,
        })
    }
}
