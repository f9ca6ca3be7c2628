// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-cost text heuristics used by the reply gate.

/// Detects whether a message reads as a question or a request for help.
///
/// A literal `?` anywhere counts, as does any configured keyword
/// (case-insensitive substring match).
pub fn is_question(text: &str, keywords: &[String]) -> bool {
    if text.contains('?') {
        return true;
    }
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw.as_str()))
}
