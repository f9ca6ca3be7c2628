// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive of sent replies with reaction-driven quality scores.
//!
//! Scores start at the neutral baseline (0) and move only through
//! [`ResponseArchive::apply_reaction`]; there is no direct score edit path.

use chrono::{DateTime, Utc};
use emcee_core::types::ReactionAction;
use emcee_core::EmceeError;
use tracing::debug;

use crate::database::Database;
use crate::models::LearnedResponse;
use crate::queries::responses;

/// Durable record of previously sent replies, ranked by feedback.
pub struct ResponseArchive {
    db: Database,
}

impl ResponseArchive {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Archive an accepted, sent reply with a neutral starting score.
    pub async fn record(
        &self,
        trigger_text: &str,
        response_text: &str,
        server_id: &str,
        message_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LearnedResponse, EmceeError> {
        let response = LearnedResponse {
            id: uuid::Uuid::new_v4().to_string(),
            server_id: server_id.to_string(),
            trigger_text: trigger_text.to_string(),
            response_text: response_text.to_string(),
            score: 0,
            message_id: Some(message_id.to_string()),
            created_at: now.to_rfc3339(),
        };
        responses::insert_response(&self.db, &response).await?;
        debug!(response_id = response.id.as_str(), server_id, "reply archived");
        Ok(response)
    }

    /// Apply one user's reaction to a response's score.
    ///
    /// Adding is idempotent per (response, user, emoji); removing reverses a
    /// previously recorded vote. Returns `true` if the score changed.
    pub async fn apply_reaction(
        &self,
        response_id: &str,
        user_id: &str,
        emoji: &str,
        delta: i64,
        action: ReactionAction,
        now: DateTime<Utc>,
    ) -> Result<bool, EmceeError> {
        match action {
            ReactionAction::Added => {
                responses::record_vote(
                    &self.db,
                    response_id,
                    user_id,
                    emoji,
                    delta,
                    &now.to_rfc3339(),
                )
                .await
            }
            ReactionAction::Removed => {
                responses::remove_vote(&self.db, response_id, user_id, emoji).await
            }
        }
    }

    /// Highest-scoring responses for a server, ties broken by most recent.
    pub async fn top_scored(
        &self,
        server_id: &str,
        limit: usize,
    ) -> Result<Vec<LearnedResponse>, EmceeError> {
        responses::top_scored(&self.db, server_id, limit).await
    }

    /// Resolve the archived response behind a sent platform message.
    pub async fn find_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<LearnedResponse>, EmceeError> {
        responses::find_by_message_id(&self.db, message_id).await
    }
}
