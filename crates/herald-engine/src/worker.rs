// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery worker: queue polling and job execution.
//!
//! Campaign creation enqueues a job on the `campaign_delivery` queue; the
//! worker polls at a fixed interval and runs dequeued campaigns through the
//! [`CampaignRunner`]. Several workers may poll the same queue; the dequeue
//! claim is atomic and a shared in-flight map keeps a campaign from running
//! twice should duplicate jobs ever exist. Shutdown stops the polling loop
//! but never interrupts a run already in flight.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use herald_core::HeraldError;
use herald_storage::queries::queue;
use herald_storage::Database;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::orchestrator::CampaignRunner;

/// Queue name for campaign delivery jobs.
pub const DELIVERY_QUEUE: &str = "campaign_delivery";

/// Payload of one delivery job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryJob {
    pub campaign_id: i64,
}

/// Enqueue a delivery job for a campaign. Returns the queue entry id.
pub async fn enqueue_campaign(db: &Database, campaign_id: i64) -> Result<i64, HeraldError> {
    let payload = serde_json::to_string(&DeliveryJob { campaign_id })
        .map_err(|e| HeraldError::Internal(format!("failed to encode delivery job: {e}")))?;
    queue::enqueue(db, DELIVERY_QUEUE, &payload).await
}

/// One polling worker over the delivery queue.
pub struct DeliveryWorker {
    worker_id: usize,
    db: Database,
    runner: Arc<CampaignRunner>,
    poll_interval: Duration,
    in_flight: Arc<DashMap<i64, ()>>,
}

impl DeliveryWorker {
    pub fn new(
        worker_id: usize,
        db: Database,
        runner: Arc<CampaignRunner>,
        poll_interval: Duration,
        in_flight: Arc<DashMap<i64, ()>>,
    ) -> Self {
        Self {
            worker_id,
            db,
            runner,
            poll_interval,
            in_flight,
        }
    }

    /// Poll the queue until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(worker_id = self.worker_id, "delivery worker running");
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        error!(worker_id = self.worker_id, error = %e, "delivery queue poll failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!(worker_id = self.worker_id, "delivery worker shutting down");
                    break;
                }
            }
        }
    }

    /// Drain everything currently pending, one job at a time.
    async fn poll_once(&self) -> Result<(), HeraldError> {
        while let Some(entry) = queue::dequeue(&self.db, DELIVERY_QUEUE).await? {
            let job: DeliveryJob = match serde_json::from_str(&entry.payload) {
                Ok(job) => job,
                Err(e) => {
                    warn!(entry_id = entry.id, error = %e, "malformed delivery job payload");
                    queue::fail(&self.db, entry.id).await?;
                    continue;
                }
            };

            // Another worker already owns this campaign; the duplicate job
            // carries no work of its own.
            if self.in_flight.insert(job.campaign_id, ()).is_some() {
                warn!(
                    worker_id = self.worker_id,
                    campaign_id = job.campaign_id,
                    "campaign already in flight, dropping duplicate job"
                );
                queue::ack(&self.db, entry.id).await?;
                continue;
            }

            let result = self.runner.run_campaign(job.campaign_id).await;
            self.in_flight.remove(&job.campaign_id);

            match result {
                Ok(()) => queue::ack(&self.db, entry.id).await?,
                Err(e) => {
                    error!(
                        worker_id = self.worker_id,
                        campaign_id = job.campaign_id,
                        error = %e,
                        "campaign run failed, failing queue entry"
                    );
                    queue::fail(&self.db, entry.id).await?;
                }
            }
        }
        Ok(())
    }
}
