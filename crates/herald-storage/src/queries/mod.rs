// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod campaigns;
pub mod comm_logs;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod queue;
pub mod segments;
