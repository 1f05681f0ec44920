// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message personalization.
//!
//! Campaign messages carry a `{name}` placeholder; rendering substitutes
//! every occurrence with the recipient's name. No other placeholder exists.

/// Render a campaign message template for one recipient.
pub fn render(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}
