// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draft reply composition.
//!
//! The composer either answers from the FAQ table (deterministic, zero
//! cost) or assembles a generation request and makes one bounded call.
//! Failure never escapes as an error: a failed or timed-out generation
//! suppresses the reply, because sending a broken or partial reply is
//! worse than staying silent.

use std::sync::Arc;
use std::time::Duration;

use emcee_config::model::{CommunityConfig, ComposerConfig, PersonaConfig};
use emcee_core::{GenerationRequest, InboundMessage, ProviderAdapter, TranscriptLine};
use emcee_storage::models::{LearnedResponse, ProfileSummary, StoredMessage};
use tracing::{debug, warn};

use crate::faq::match_faq;
use crate::prompt::{SILENCE_MARKER, build_system_prompt};

/// Where a draft came from. FAQ answers are operator-authored and skip the
/// quality filter; generated drafts do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSource {
    Faq,
    Generated,
}

/// A composed reply awaiting the quality filter and send.
#[derive(Debug, Clone)]
pub struct Draft {
    pub text: String,
    pub source: DraftSource,
}

/// Builds generation requests and turns them into draft replies.
pub struct Composer {
    config: ComposerConfig,
    persona: PersonaConfig,
    agent_name: String,
    generate_timeout: Duration,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
}

impl Composer {
    pub fn new(
        config: ComposerConfig,
        persona: PersonaConfig,
        agent_name: String,
        generate_timeout: Duration,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
    ) -> Self {
        Self {
            config,
            persona,
            agent_name,
            generate_timeout,
            provider,
        }
    }

    /// How many recent channel messages the composer wants as context.
    pub fn history_limit(&self) -> usize {
        self.config.history_limit
    }

    /// How many archived responses to fetch as exemplar candidates.
    pub fn exemplar_limit(&self) -> usize {
        self.config.exemplar_limit
    }

    /// Compose a draft reply, or decide to stay silent.
    ///
    /// Returns `None` when the generation call fails, times out, or the
    /// model itself declines with the silence marker.
    pub async fn compose(
        &self,
        msg: &InboundMessage,
        community: &CommunityConfig,
        profile: &ProfileSummary,
        history: &[StoredMessage],
        exemplars: &[LearnedResponse],
    ) -> Option<Draft> {
        if let Some(answer) = match_faq(&msg.text, &community.faq) {
            debug!(channel_id = msg.channel_id.as_str(), "FAQ short-circuit");
            return Some(Draft {
                text: answer.to_string(),
                source: DraftSource::Faq,
            });
        }

        // Only replies with proven positive feedback qualify as exemplars.
        let exemplars: Vec<&LearnedResponse> = exemplars
            .iter()
            .filter(|r| r.score >= self.config.min_exemplar_score)
            .take(self.config.exemplar_limit)
            .collect();

        let system_prompt = build_system_prompt(
            &self.agent_name,
            &self.persona,
            community,
            &msg.author_id,
            profile,
            &exemplars,
        );

        let mut transcript = to_transcript(history);
        if transcript.is_empty() {
            transcript.push(TranscriptLine {
                speaker: msg.author_id.clone(),
                text: msg.text.clone(),
                from_agent: false,
            });
        }

        let request = GenerationRequest {
            system_prompt,
            transcript,
            max_tokens: self.config.max_tokens,
        };

        let text = match tokio::time::timeout(
            self.generate_timeout,
            self.provider.generate(request),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "generation failed, suppressing reply");
                return None;
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.generate_timeout.as_secs(),
                    "generation timed out, suppressing reply"
                );
                return None;
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() || text.contains(SILENCE_MARKER) {
            debug!("model declined to reply");
            return None;
        }

        Some(Draft {
            text,
            source: DraftSource::Generated,
        })
    }
}

/// Maps stored channel history to transcript lines, oldest first.
fn to_transcript(history: &[StoredMessage]) -> Vec<TranscriptLine> {
    history
        .iter()
        .map(|m| TranscriptLine {
            speaker: m.author_id.clone(),
            text: m.content.clone(),
            from_agent: m.is_from_agent,
        })
        .collect()
}
