// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user interaction history and topic-interest tracking.
//!
//! Profiles accumulate additively: every observed message bumps the author's
//! last-seen timestamp and topic counters, and every agent reply bumps the
//! interaction counter. Nothing is ever removed.

use chrono::{DateTime, Utc};
use emcee_config::model::TopicsConfig;
use emcee_core::EmceeError;
use tracing::debug;

use crate::database::Database;
use crate::models::{ProfileSummary, UserProfile};
use crate::queries::{messages, profiles};
use crate::topics::TopicMatcher;

/// Durable record of who says what, and how often the agent has talked to them.
pub struct ProfileStore {
    db: Database,
    topics: TopicMatcher,
}

impl ProfileStore {
    pub fn new(db: Database, topics_config: &TopicsConfig) -> Self {
        Self {
            db,
            topics: TopicMatcher::new(topics_config),
        }
    }

    /// Record an observed message against its author's profile.
    ///
    /// Bumps the last-seen timestamp and every topic label the message
    /// matches. Returns the detected topics.
    pub async fn record_message(
        &self,
        user_id: &str,
        server_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, EmceeError> {
        let now_str = now.to_rfc3339();
        profiles::touch_profile(&self.db, user_id, server_id, &now_str).await?;

        let detected = self.topics.detect(text);
        for topic in &detected {
            profiles::bump_topic(&self.db, user_id, server_id, topic, &now_str).await?;
        }
        if !detected.is_empty() {
            debug!(user_id, server_id, topics = ?detected, "topics recorded");
        }
        Ok(detected)
    }

    /// Record that the agent replied to this user.
    pub async fn record_interaction(
        &self,
        user_id: &str,
        server_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), EmceeError> {
        profiles::bump_interaction(&self.db, user_id, server_id, &now.to_rfc3339()).await
    }

    /// Fetch a user's raw profile, if one exists.
    pub async fn get_profile(
        &self,
        user_id: &str,
        server_id: &str,
    ) -> Result<Option<UserProfile>, EmceeError> {
        profiles::get_profile(&self.db, user_id, server_id).await
    }

    /// Condensed view of a user for the composer's user-context block.
    pub async fn summary(
        &self,
        user_id: &str,
        server_id: &str,
        topic_limit: usize,
    ) -> Result<ProfileSummary, EmceeError> {
        let profile = profiles::get_profile(&self.db, user_id, server_id).await?;
        let top_topics = profiles::top_topics(&self.db, user_id, server_id, topic_limit).await?;
        let message_count = messages::count_for_author(&self.db, user_id, server_id).await?;

        Ok(ProfileSummary {
            interaction_count: profile.as_ref().map(|p| p.interaction_count).unwrap_or(0),
            message_count,
            top_topics,
            last_seen_at: profile.map(|p| p.last_seen_at),
        })
    }
}
