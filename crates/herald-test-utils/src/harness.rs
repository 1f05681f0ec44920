// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end delivery testing.
//!
//! `TestHarness` assembles a complete delivery pipeline with a mock
//! vendor, temp SQLite database, campaign runner, and a buffered receipt
//! channel. Tests drive campaigns with `run_campaign()` and control
//! exactly when the two-phase finalization happens with
//! `apply_pending_receipts()`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use herald_core::types::NewCustomer;
use herald_core::vendor::{DeliveryReceipt, DeliveryVendor};
use herald_core::HeraldError;
use herald_engine::receipts;
use herald_engine::{CampaignRunner, DeliveryWorker};
use herald_storage::Database;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::mock_vendor::{MockVendor, VendorOutcome};

/// Receipts buffered between the vendor and `apply_pending_receipts`.
/// A campaign dispatching more messages than this would block mid-run.
const RECEIPT_BUFFER: usize = 1024;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<VendorOutcome>,
    fallback: VendorOutcome,
    pacing: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            fallback: VendorOutcome::Sent,
            pacing: Duration::ZERO,
        }
    }

    /// Set scripted vendor outcomes, consumed in dispatch order.
    pub fn with_script(mut self, script: Vec<VendorOutcome>) -> Self {
        self.script = script;
        self
    }

    /// Set the outcome repeated once the script is exhausted.
    pub fn with_fallback(mut self, fallback: VendorOutcome) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the pause between consecutive dispatches (zero by default).
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, HeraldError> {
        // Create temp directory for SQLite
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| HeraldError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        // Wire the mock vendor to a buffered receipt channel
        let (receipt_tx, receipt_rx) = mpsc::channel(RECEIPT_BUFFER);
        let vendor = Arc::new(
            MockVendor::with_script(self.script, self.fallback).emit_receipts(receipt_tx),
        );

        let runner = Arc::new(CampaignRunner::new(
            db.clone(),
            vendor.clone() as Arc<dyn DeliveryVendor>,
            self.pacing,
        ));

        Ok(TestHarness {
            db,
            vendor,
            runner,
            receipt_rx: Mutex::new(receipt_rx),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete delivery pipeline over a temp database.
///
/// Provides access to the storage handle and mock vendor for assertions,
/// plus `run_campaign()` to drive a delivery run and
/// `apply_pending_receipts()` to finalize the per-recipient ledger.
pub struct TestHarness {
    /// Storage handle (temp DB, cleaned up on drop).
    pub db: Database,
    /// The mock vendor, for outcome control and dispatch assertions.
    pub vendor: Arc<MockVendor>,
    /// Campaign runner wired to the mock vendor.
    pub runner: Arc<CampaignRunner>,
    receipt_rx: Mutex<mpsc::Receiver<DeliveryReceipt>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one campaign through the runner to its terminal state.
    pub async fn run_campaign(&self, campaign_id: i64) -> Result<(), HeraldError> {
        self.runner.run_campaign(campaign_id).await
    }

    /// Apply every receipt buffered so far; returns how many were applied.
    ///
    /// The mock vendor emits receipts synchronously, so once
    /// `run_campaign` returns this finalizes every dispatched log. Until
    /// it is called, the logs stay `pending`.
    pub async fn apply_pending_receipts(&self) -> Result<usize, HeraldError> {
        let mut rx = self.receipt_rx.lock().await;
        let mut applied = 0;
        while let Ok(receipt) = rx.try_recv() {
            receipts::apply_receipt(&self.db, &receipt).await?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Spawn a delivery worker polling the queue until cancellation.
    pub fn start_worker(&self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let worker = DeliveryWorker::new(
            0,
            self.db.clone(),
            self.runner.clone(),
            Duration::from_millis(10),
            Arc::new(DashMap::new()),
        );
        tokio::spawn(async move { worker.run(cancel).await })
    }
}

/// A `NewCustomer` with no purchase history, for tests that only need
/// a deliverable recipient.
pub fn customer(name: &str, email: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        total_spent: 0.0,
        visit_count: 0,
        last_purchase_date: None,
        is_active: true,
    }
}
