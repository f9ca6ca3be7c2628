// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction-to-score mapping.
//!
//! Positive-affect reactions are worth +1, negative-affect ones -1, and
//! everything else is ignored. Idempotency per (response, user, emoji) is
//! enforced by the archive, not here.

/// Reactions that count as approval.
const POSITIVE_REACTIONS: &[&str] = &["👍", "❤️", "🔥", "✅", "💯", "🙌", "👏", "🎯", "⭐"];

/// Reactions that count as disapproval.
const NEGATIVE_REACTIONS: &[&str] = &["👎", "❌", "😕", "🤔"];

/// The score delta an emoji contributes, or `None` for neutral reactions.
pub fn score_delta(emoji: &str) -> Option<i64> {
    if POSITIVE_REACTIONS.contains(&emoji) {
        Some(1)
    } else if NEGATIVE_REACTIONS.contains(&emoji) {
        Some(-1)
    } else {
        None
    }
}
