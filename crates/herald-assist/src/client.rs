// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible chat-completions API.
//!
//! Provides [`AssistClient`] which handles request construction, bearer
//! authentication, JSON-mode completions, and transient error retry.

use std::time::Duration;

use herald_config::model::AssistConfig;
use herald_core::HeraldError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// HTTP client for assist completions.
///
/// Manages the bearer header, connection pooling, and retry logic for
/// transient errors (429, 500, 503). Every completion runs in JSON mode;
/// the operations layer parses the returned object.
#[derive(Debug, Clone)]
pub struct AssistClient {
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    base_url: String,
}

impl AssistClient {
    /// Creates a client from the assist configuration.
    ///
    /// Fails when no API key is configured; callers that want to treat a
    /// missing key as "assist disabled" check `api_key` before constructing.
    pub fn new(config: &AssistConfig) -> Result<Self, HeraldError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            HeraldError::Config("assist api_key is required to build the assist client".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| HeraldError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| HeraldError::Assist {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: 1,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Runs a JSON-mode completion and returns the raw content string.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second
    /// delay.
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String, HeraldError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::json_object(),
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying assist request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| HeraldError::Assist {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "assist response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| HeraldError::Assist {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let chat: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| HeraldError::Assist {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return chat
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| HeraldError::Assist {
                        message: "assist response contained no completion".to_string(),
                        source: None,
                    });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(HeraldError::Assist {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                match api_err.error.type_ {
                    Some(type_) => format!("assist API error ({type_}): {}", api_err.error.message),
                    None => format!("assist API error: {}", api_err.error.message),
                }
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(HeraldError::Assist {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| HeraldError::Assist {
            message: "assist request failed after retries".to_string(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
