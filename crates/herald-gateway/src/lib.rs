// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP REST gateway for the Herald CRM engine.
//!
//! Serves the user-facing API (segments, campaigns, dashboard, assist)
//! behind optional bearer auth, and the public machine endpoints
//! (ingestion, delivery receipts, health, metrics). Handlers stay thin:
//! validation at the boundary, then straight through to the storage and
//! engine crates.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse};
pub use server::{router, start_server, GatewayState, HealthState, ServerConfig};
