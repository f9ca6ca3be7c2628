// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the emcee agent.
//!
//! Implements [`ProviderAdapter`] over the Messages API: reply generation
//! on the configured generate model and yes/no judgments on a cheaper,
//! faster classify model.

pub mod client;
pub mod types;

use async_trait::async_trait;
use emcee_config::model::AnthropicConfig;
use emcee_core::error::EmceeError;
use emcee_core::traits::{PluginAdapter, ProviderAdapter};
use emcee_core::types::{AdapterType, GenerationRequest, HealthStatus, TranscriptLine};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Max tokens for a classification verdict; one word plus slack.
const CLASSIFY_MAX_TOKENS: u32 = 16;

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    generate_model: String,
    classify_model: String,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &AnthropicConfig) -> Result<Self, EmceeError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = AnthropicClient::new(api_key, config.api_version.clone())?;

        info!(
            generate_model = config.generate_model.as_str(),
            classify_model = config.classify_model.as_str(),
            "Anthropic provider initialized"
        );

        Ok(Self {
            client,
            generate_model: config.generate_model.clone(),
            classify_model: config.classify_model.clone(),
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AnthropicClient, generate_model: &str, classify_model: &str) -> Self {
        Self {
            client,
            generate_model: generate_model.to_string(),
            classify_model: classify_model.to_string(),
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, EmceeError> {
        // The client is constructable and holds valid headers; a live API
        // call would spend tokens on every check.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), EmceeError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, EmceeError> {
        let messages = render_transcript(&request.transcript);
        if messages.is_empty() {
            return Err(EmceeError::Provider {
                message: "generation request has an empty transcript".into(),
                source: None,
            });
        }

        let api_request = MessageRequest {
            model: self.generate_model.clone(),
            messages,
            system: Some(request.system_prompt),
            max_tokens: request.max_tokens,
        };

        let response = self.client.complete_message(&api_request).await?;
        Ok(response.text())
    }

    async fn classify(&self, prompt: &str) -> Result<bool, EmceeError> {
        let api_request = MessageRequest {
            model: self.classify_model.clone(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            system: None,
            max_tokens: CLASSIFY_MAX_TOKENS,
        };

        let response = self.client.complete_message(&api_request).await?;
        Ok(parse_verdict(&response.text()))
    }
}

/// Resolves the API key from config, falling back to the environment.
fn resolve_api_key(configured: &Option<String>) -> Result<String, EmceeError> {
    if let Some(key) = configured
        && !key.is_empty()
    {
        return Ok(key.clone());
    }
    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        EmceeError::Config(
            "Anthropic API key required: set anthropic.api_key or the ANTHROPIC_API_KEY env var"
                .to_string(),
        )
    })
}

/// Renders transcript lines into API messages.
///
/// The Messages API wants strictly alternating user/assistant turns that
/// start and end with the user, so consecutive same-speaker-side lines are
/// merged, a leading agent turn is dropped, and a trailing agent turn gets
/// a neutral continuation nudge appended.
fn render_transcript(transcript: &[TranscriptLine]) -> Vec<ApiMessage> {
    let mut messages: Vec<ApiMessage> = Vec::new();

    for line in transcript {
        let role = if line.from_agent { "assistant" } else { "user" };
        let content = if line.from_agent {
            line.text.clone()
        } else {
            format!("[{}]: {}", line.speaker, line.text)
        };

        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push('\n');
                last.content.push_str(&content);
            }
            _ => messages.push(ApiMessage {
                role: role.to_string(),
                content,
            }),
        }
    }

    if messages.first().is_some_and(|m| m.role == "assistant") {
        messages.remove(0);
    }
    if messages.last().is_some_and(|m| m.role == "assistant") {
        messages.push(ApiMessage {
            role: "user".to_string(),
            content: "[system]: continue the conversation if appropriate".to_string(),
        });
    }

    messages
}

/// Interprets a classification reply.
///
/// Only a leading YES counts as affirmative; anything unparsable is `false`
/// so a confused classifier errs toward silence.
fn parse_verdict(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    if upper.starts_with("YES") {
        true
    } else if upper.starts_with("NO") {
        false
    } else {
        debug!(reply = text, "unparsable classification verdict, treating as no");
        false
    }
}
