// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based topic detection.
//!
//! The mapping is configured, finite, and many-to-one: several keywords may
//! feed the same topic label. Matching is case-insensitive substring
//! containment, and a message increments each matched label at most once.

use std::collections::BTreeSet;

use emcee_config::model::TopicsConfig;

/// Deterministic keyword-to-topic matcher built from configuration.
pub struct TopicMatcher {
    /// (lowercased keyword, topic label) pairs.
    keywords: Vec<(String, String)>,
}

impl TopicMatcher {
    pub fn new(config: &TopicsConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|(keyword, topic)| (keyword.to_lowercase(), topic.clone()))
            .collect();
        Self { keywords }
    }

    /// Topic labels mentioned by a message, each at most once, in stable
    /// (sorted) order.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut found = BTreeSet::new();
        for (keyword, topic) in &self.keywords {
            if lower.contains(keyword.as_str()) {
                found.insert(topic.clone());
            }
        }
        found.into_iter().collect()
    }
}
