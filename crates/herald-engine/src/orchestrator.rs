// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign run orchestration.
//!
//! A run drives one campaign end to end: resolve the audience live, walk it
//! strictly in order, dispatch one message per recipient through the vendor,
//! and finalize the campaign counters. Per-recipient delivery truth is owned
//! by the delivery receipt, not by the run; the run only tallies immediate
//! outcomes. An error anywhere after the campaign is loaded marks the
//! campaign `failed` and surfaces the error to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use herald_core::types::{Campaign, LogStatus};
use herald_core::vendor::{DeliveryVendor, DispatchRequest, VendorStatus};
use herald_core::HeraldError;
use herald_storage::queries::{campaigns, comm_logs, segments};
use herald_storage::Database;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::{audience, recording, template};

/// Failure reason recorded on a log row when the vendor call itself fails.
pub const VENDOR_ERROR_REASON: &str = "vendor error";

/// Runs campaigns against a delivery vendor.
///
/// Shared by all delivery workers; holds the storage handle, the vendor
/// seam, and the inter-recipient pacing delay.
pub struct CampaignRunner {
    db: Database,
    vendor: Arc<dyn DeliveryVendor>,
    pacing: Duration,
}

impl CampaignRunner {
    pub fn new(db: Database, vendor: Arc<dyn DeliveryVendor>, pacing: Duration) -> Self {
        Self { db, vendor, pacing }
    }

    /// Execute one campaign run to a terminal state.
    ///
    /// A missing campaign id is an error with nothing to mark. Every other
    /// failure marks the campaign `failed` (best effort) before returning.
    pub async fn run_campaign(&self, campaign_id: i64) -> Result<(), HeraldError> {
        let campaign = campaigns::get(&self.db, campaign_id)
            .await?
            .ok_or_else(|| HeraldError::NotFound {
                entity: "campaign".to_string(),
                id: campaign_id,
            })?;

        match self.deliver(&campaign).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(campaign_id, error = %e, "campaign run failed");
                if let Err(mark) = campaigns::mark_failed(&self.db, campaign_id).await {
                    error!(campaign_id, error = %mark, "could not mark campaign failed");
                }
                recording::record_campaign("failed");
                Err(e)
            }
        }
    }

    async fn deliver(&self, campaign: &Campaign) -> Result<(), HeraldError> {
        let segment = segments::get(&self.db, campaign.segment_id)
            .await?
            .ok_or_else(|| HeraldError::NotFound {
                entity: "segment".to_string(),
                id: campaign.segment_id,
            })?;

        // The audience is evaluated now, not at campaign creation; the
        // segment's stored audience_size is only a stale snapshot.
        let audience = audience::resolve_audience(&self.db, &segment.rules).await?;
        campaigns::mark_active(&self.db, campaign.id, audience.len() as i64).await?;
        info!(
            campaign_id = campaign.id,
            segment_id = segment.id,
            audience = audience.len(),
            "campaign delivery started"
        );

        let mut delivered: i64 = 0;
        let mut failed: i64 = 0;

        for customer in &audience {
            let message = template::render(&campaign.message, &customer.name);
            let log =
                comm_logs::insert_pending(&self.db, campaign.id, customer.id, &message).await?;

            let request = DispatchRequest {
                log_id: log.id,
                campaign_id: campaign.id,
                customer_email: customer.email.clone(),
                customer_name: customer.name.clone(),
                message,
            };

            let started = Instant::now();
            match self.vendor.send(request).await {
                Ok(response) => {
                    recording::record_vendor_latency(started.elapsed().as_secs_f64());
                    match response.status {
                        // The log stays pending either way; the receipt is
                        // what finalizes it.
                        VendorStatus::Sent => {
                            delivered += 1;
                            recording::record_dispatch("sent");
                        }
                        VendorStatus::Failed => {
                            failed += 1;
                            recording::record_dispatch("failed");
                        }
                    }
                }
                Err(e) => {
                    recording::record_vendor_latency(started.elapsed().as_secs_f64());
                    failed += 1;
                    recording::record_dispatch("error");
                    warn!(
                        campaign_id = campaign.id,
                        log_id = log.id,
                        error = %e,
                        "vendor transport error"
                    );
                    // No receipt will ever arrive for this dispatch, so the
                    // log is failed eagerly.
                    comm_logs::update_status(
                        &self.db,
                        log.id,
                        LogStatus::Failed,
                        Some(Utc::now()),
                        Some(VENDOR_ERROR_REASON.to_string()),
                        None,
                    )
                    .await?;
                }
            }

            tokio::time::sleep(self.pacing).await;
        }

        let success_rate = success_rate(delivered, audience.len());
        campaigns::finalize(&self.db, campaign.id, delivered, failed, success_rate, Utc::now())
            .await?;
        recording::record_campaign("completed");
        info!(
            campaign_id = campaign.id,
            delivered, failed, success_rate, "campaign completed"
        );
        Ok(())
    }
}

/// Percentage of delivered messages, rounded to two decimals; 0 for an
/// empty audience.
fn success_rate(delivered: i64, audience: usize) -> f64 {
    if audience == 0 {
        return 0.0;
    }
    let percent = delivered as f64 / audience as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}
