// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! Timestamps are stored as RFC 3339 UTC strings; lexicographic order on the
//! column matches chronological order because every writer uses the same
//! format.

/// A chat message as persisted, inbound or outbound.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: String,
    pub server_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub is_from_agent: bool,
    pub reply_to_id: Option<String>,
    pub created_at: String,
}

/// Per-(user, server) interaction record.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub server_id: String,
    pub interaction_count: i64,
    pub notes: String,
    pub last_seen_at: String,
}

/// One topic-frequency counter for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCount {
    pub topic: String,
    pub frequency: i64,
}

/// A reply the agent sent, scored by reaction feedback.
#[derive(Debug, Clone)]
pub struct LearnedResponse {
    pub id: String,
    pub server_id: String,
    pub trigger_text: String,
    pub response_text: String,
    pub score: i64,
    /// Platform id of the sent message, for resolving reaction events.
    pub message_id: Option<String>,
    pub created_at: String,
}

/// Condensed view of a user handed to the composer.
#[derive(Debug, Clone, Default)]
pub struct ProfileSummary {
    pub interaction_count: i64,
    pub message_count: i64,
    pub top_topics: Vec<TopicCount>,
    pub last_seen_at: Option<String>,
}
