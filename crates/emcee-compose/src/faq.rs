// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Predefined-answer matching.
//!
//! The deterministic, zero-cost path: a message matching a configured FAQ
//! pattern gets the canonical answer verbatim, and generation never runs.

use emcee_config::model::FaqEntry;

/// Returns the predefined answer for the first FAQ entry whose pattern
/// matches the message (case-insensitive substring).
pub fn match_faq<'a>(text: &str, entries: &'a [FaqEntry]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    for entry in entries {
        if entry
            .patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
        {
            return Some(entry.answer.as_str());
        }
    }
    None
}
