// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the emcee workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform-assigned identifier for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a seam.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
}

/// A message observed in the chat server, inbound or outbound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub server_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// The message names the agent directly (platform mention).
    pub mentions_agent: bool,
    /// The message is a reply to one of the agent's earlier messages.
    pub is_reply_to_agent: bool,
    /// The message was authored by the agent itself.
    pub is_from_agent: bool,
}

/// A reply the agent wants delivered to a channel.
#[derive(Debug, Clone)]
pub struct OutboundReply {
    pub channel_id: String,
    pub text: String,
    /// Message the reply should thread under, when the platform supports it.
    pub reply_to: Option<MessageId>,
}

/// Whether a reaction was placed on or removed from a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionAction {
    Added,
    Removed,
}

/// An emoji reaction on one of the agent's sent replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Platform id of the message the reaction landed on.
    pub message_id: MessageId,
    pub emoji: String,
    pub user_id: String,
    pub action: ReactionAction,
}

/// Events delivered by a channel adapter.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Message(InboundMessage),
    Reaction(ReactionEvent),
    /// The platform connection ended; the agent loop should exit.
    Closed,
}

/// One line of channel history rendered into a generation request.
#[derive(Debug, Clone)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
    pub from_agent: bool,
}

/// A request to the LLM provider's generation endpoint.
///
/// The provider owns model selection; the request carries only the assembled
/// prompt material.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub transcript: Vec<TranscriptLine>,
    pub max_tokens: u32,
}
