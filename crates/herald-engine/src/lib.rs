// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign delivery pipeline for the Herald CRM engine.
//!
//! The engine turns a stored campaign into per-recipient dispatches:
//! - [`audience`] materializes the customers a segment's rules match
//! - [`orchestrator`] runs one campaign end to end against the vendor
//! - [`worker`] polls the delivery queue and executes runs
//! - [`receipts`] applies asynchronous delivery receipts to the log
//! - [`template`] renders the `{name}` placeholder
//! - [`recording`] exposes the pipeline's metrics
//! - [`shutdown`] installs the signal handler the workers watch

pub mod audience;
pub mod orchestrator;
pub mod receipts;
pub mod recording;
pub mod shutdown;
pub mod template;
pub mod worker;

pub use orchestrator::{CampaignRunner, VENDOR_ERROR_REASON};
pub use worker::{enqueue_campaign, DeliveryJob, DeliveryWorker, DELIVERY_QUEUE};
