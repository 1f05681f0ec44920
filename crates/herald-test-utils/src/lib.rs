// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for herald integration tests.
//!
//! Provides a scripted vendor and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without timing-dependent simulation.
//!
//! # Components
//!
//! - [`MockVendor`] - Delivery vendor with pre-scripted dispatch outcomes
//! - [`TestHarness`] - Complete delivery pipeline over a temp database

pub mod harness;
pub mod mock_vendor;

pub use harness::{customer, TestHarness, TestHarnessBuilder};
pub use mock_vendor::{MockVendor, VendorOutcome};
