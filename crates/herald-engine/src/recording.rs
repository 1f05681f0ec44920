// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_histogram};

/// Register all Herald metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "herald_dispatches_total",
        "Vendor dispatch attempts by outcome"
    );
    describe_counter!(
        "herald_campaigns_total",
        "Campaign runs by terminal status"
    );
    describe_counter!("herald_receipts_total", "Delivery receipts applied");
    describe_histogram!(
        "herald_vendor_latency_seconds",
        "Vendor send latency in seconds"
    );
}

/// Record one dispatch attempt. Outcomes: `sent`, `failed`, `error`.
pub fn record_dispatch(outcome: &str) {
    metrics::counter!("herald_dispatches_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a campaign reaching a terminal status (`completed` or `failed`).
pub fn record_campaign(status: &str) {
    metrics::counter!("herald_campaigns_total", "status" => status.to_string()).increment(1);
}

/// Record an applied delivery receipt.
pub fn record_receipt() {
    metrics::counter!("herald_receipts_total").increment(1);
}

/// Record one vendor send round-trip.
pub fn record_vendor_latency(seconds: f64) {
    metrics::histogram!("herald_vendor_latency_seconds").record(seconds);
}
