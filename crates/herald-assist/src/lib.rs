// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM assist for the Herald CRM engine.
//!
//! Talks to an OpenAI-compatible chat-completions API to turn natural
//! language into segment rules, draft campaign message variants, and
//! summarize campaign performance. All completions run in JSON mode and
//! the structured output is treated as untrusted input.
//!
//! The assist layer is optional: without an API key the client cannot be
//! constructed and the gateway serves 503 for the assist routes.

pub mod client;
pub mod ops;
pub mod types;

pub use client::AssistClient;
pub use ops::{generate_campaign_insights, generate_campaign_messages, generate_segment_rules};
pub use types::{CampaignInsights, CampaignPerformance, MessageVariant};
