// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The quality gate a generated draft must clear before it is sent.
//!
//! Heuristic pattern checks run first and are free; only drafts that pass
//! them spend a naturalness classification call. Rejection is final: the
//! draft is discarded and the agent stays silent (single-attempt policy,
//! no recomposition).

use std::sync::Arc;
use std::time::Duration;

use emcee_config::model::FilterConfig;
use emcee_core::ProviderAdapter;
use regex::Regex;
use tracing::{debug, warn};

/// Why a draft was rejected. Logged, never user-visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLong,
    AiPhrase,
    TooManyExclamations,
    BulletList,
    SoundsLikeAssistant,
    ClassifierUnavailable,
}

/// Accepts or rejects composed drafts.
pub struct QualityFilter {
    config: FilterConfig,
    bullet_pattern: Regex,
    classify_timeout: Duration,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
}

impl QualityFilter {
    pub fn new(
        config: FilterConfig,
        classify_timeout: Duration,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
    ) -> Self {
        Self {
            config,
            // Lines opening with a bullet glyph.
            bullet_pattern: Regex::new(r"(?m)^\s*[-•*]\s").expect("static pattern"),
            classify_timeout,
            provider,
        }
    }

    /// Whether the draft may be sent.
    pub async fn accept(&self, draft: &str) -> bool {
        match self.check(draft).await {
            None => true,
            Some(reason) => {
                debug!(?reason, "draft rejected");
                false
            }
        }
    }

    /// Runs every check and returns the first failure, if any.
    ///
    /// The length ceiling is absolute: oversized drafts are rejected before
    /// (and regardless of) the classification call.
    async fn check(&self, draft: &str) -> Option<RejectReason> {
        if let Some(reason) = self.heuristic_check(draft) {
            return Some(reason);
        }

        let prompt = naturalness_prompt(draft);
        match tokio::time::timeout(self.classify_timeout, self.provider.classify(&prompt)).await
        {
            Ok(Ok(true)) => None,
            Ok(Ok(false)) => Some(RejectReason::SoundsLikeAssistant),
            Ok(Err(e)) => {
                warn!(error = %e, "naturalness classification failed, rejecting draft");
                Some(RejectReason::ClassifierUnavailable)
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.classify_timeout.as_secs(),
                    "naturalness classification timed out, rejecting draft"
                );
                Some(RejectReason::ClassifierUnavailable)
            }
        }
    }

    /// The zero-cost pattern checks.
    fn heuristic_check(&self, draft: &str) -> Option<RejectReason> {
        if draft.chars().count() > self.config.max_chars {
            return Some(RejectReason::TooLong);
        }

        let lower = draft.to_lowercase();
        if self
            .config
            .ai_phrases
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
        {
            return Some(RejectReason::AiPhrase);
        }

        if draft.matches('!').count() > self.config.max_exclamations {
            return Some(RejectReason::TooManyExclamations);
        }

        if self.bullet_pattern.find_iter(draft).count() > self.config.max_bullet_lines {
            return Some(RejectReason::BulletList);
        }

        None
    }
}

/// Builds the yes/no naturalness prompt for a draft.
fn naturalness_prompt(draft: &str) -> String {
    format!(
        "Does the following chat reply sound like a real person typing in a \
         community chat, or like an AI assistant?\n\
         \n\
         Reply to evaluate: \"{draft}\"\n\
         \n\
         Answer YES if it sounds like a real person, NO if it sounds like an \
         AI assistant."
    )
}
