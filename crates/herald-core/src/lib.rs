// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the herald campaign engine.
//!
//! This crate provides the error type, the domain entities, the segment rule
//! predicate model, and the delivery vendor trait used throughout the herald
//! workspace. It has no I/O of its own; rule evaluation in particular is a
//! pure function over in-memory customers.

pub mod error;
pub mod rules;
pub mod types;
pub mod vendor;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use types::{
    Campaign, CampaignStatus, CommunicationLog, Customer, CustomerUpdate, LogStatus, NewCampaign,
    NewCustomer, NewOrder, NewSegment, Order, Segment,
};
pub use vendor::{
    DeliveryReceipt, DeliveryVendor, DispatchRequest, VendorResponse, VendorStatus,
};
