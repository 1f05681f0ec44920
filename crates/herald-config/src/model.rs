// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for herald.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level herald configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Campaign delivery worker settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Simulated delivery vendor settings.
    #[serde(default)]
    pub vendor: VendorConfig,

    /// LLM assist provider settings.
    #[serde(default)]
    pub assist: AssistConfig,

    /// Metrics exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the API server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the API server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token protecting the user-facing routes. `None` disables
    /// authentication entirely (logged as a warning at startup).
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8470
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "herald.db".to_string()
}

/// Campaign delivery worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Delay between queue polls when the queue is empty, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Pause between consecutive sends within one campaign, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Number of delivery workers. Each campaign still runs on exactly one
    /// worker at a time.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            pacing_ms: default_pacing_ms(),
            workers: default_workers(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_pacing_ms() -> u64 {
    100
}

fn default_workers() -> usize {
    1
}

/// Simulated delivery vendor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VendorConfig {
    /// Probability in `[0, 1]` that a dispatch comes back `SENT`.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Lower bound of the simulated dispatch latency, in milliseconds.
    #[serde(default = "default_latency_ms_min")]
    pub latency_ms_min: u64,

    /// Upper bound of the simulated dispatch latency, in milliseconds.
    #[serde(default = "default_latency_ms_max")]
    pub latency_ms_max: u64,

    /// Lower bound of the delay before the asynchronous delivery receipt,
    /// in milliseconds.
    #[serde(default = "default_receipt_delay_ms_min")]
    pub receipt_delay_ms_min: u64,

    /// Upper bound of the delay before the asynchronous delivery receipt,
    /// in milliseconds.
    #[serde(default = "default_receipt_delay_ms_max")]
    pub receipt_delay_ms_max: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            latency_ms_min: default_latency_ms_min(),
            latency_ms_max: default_latency_ms_max(),
            receipt_delay_ms_min: default_receipt_delay_ms_min(),
            receipt_delay_ms_max: default_receipt_delay_ms_max(),
        }
    }
}

fn default_success_rate() -> f64 {
    0.9
}

fn default_latency_ms_min() -> u64 {
    500
}

fn default_latency_ms_max() -> u64 {
    1500
}

fn default_receipt_delay_ms_min() -> u64 {
    1000
}

fn default_receipt_delay_ms_max() -> u64 {
    3000
}

/// LLM assist provider configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistConfig {
    /// API key. `None` disables the assist endpoints.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_assist_base_url")]
    pub base_url: String,

    /// Model to use for assist requests.
    #[serde(default = "default_assist_model")]
    pub model: String,

    /// Maximum tokens per completion.
    #[serde(default = "default_assist_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_assist_base_url(),
            model: default_assist_model(),
            max_tokens: default_assist_max_tokens(),
        }
    }
}

fn default_assist_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_assist_model() -> String {
    "gpt-4o".to_string()
}

fn default_assist_max_tokens() -> u32 {
    1024
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default)]
    pub enabled: bool,
}
