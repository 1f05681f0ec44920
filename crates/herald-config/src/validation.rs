// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, probability ranges, and
//! ordered latency windows.

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate server.host is not empty
    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    // Validate server.host looks like a valid IP or hostname
    if !config.server.host.trim().is_empty() {
        let host = config.server.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate the vendor success probability is a probability
    let rate = config.vendor.success_rate;
    if !(0.0..=1.0).contains(&rate) || rate.is_nan() {
        errors.push(ConfigError::Validation {
            message: format!("vendor.success_rate must be within 0.0..=1.0, got {rate}"),
        });
    }

    // Validate latency and receipt delay windows are ordered
    if config.vendor.latency_ms_min > config.vendor.latency_ms_max {
        errors.push(ConfigError::Validation {
            message: format!(
                "vendor.latency_ms_min ({}) must not exceed vendor.latency_ms_max ({})",
                config.vendor.latency_ms_min, config.vendor.latency_ms_max
            ),
        });
    }

    if config.vendor.receipt_delay_ms_min > config.vendor.receipt_delay_ms_max {
        errors.push(ConfigError::Validation {
            message: format!(
                "vendor.receipt_delay_ms_min ({}) must not exceed vendor.receipt_delay_ms_max ({})",
                config.vendor.receipt_delay_ms_min, config.vendor.receipt_delay_ms_max
            ),
        });
    }

    // Validate at least one delivery worker
    if config.delivery.workers < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.workers must be at least 1, got {}",
                config.delivery.workers
            ),
        });
    }

    // An empty bearer token is almost certainly a templating mistake;
    // absent means auth is intentionally off.
    if let Some(token) = &config.server.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "server.bearer_token must not be empty when set; omit it to disable auth"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
