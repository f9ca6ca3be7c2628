// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop for the emcee community-management agent.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives message and reaction events from a channel adapter
//! - Runs each message through the gate -> compose -> filter -> send pipeline
//! - Records sent replies for learning and charges the rate limiter
//! - Applies reaction feedback to archived replies
//! - Handles graceful shutdown
//!
//! Events are handled one at a time from a single receive loop, so there is
//! no racing on cooldown or quota state. Persistence along the pipeline is
//! best-effort: losing one learning update is logged, never fatal.

pub mod feedback;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use emcee_compose::{Composer, DraftSource};
use emcee_config::EmceeConfig;
use emcee_core::error::EmceeError;
use emcee_core::types::{
    ChannelEvent, InboundMessage, OutboundReply, ReactionEvent,
};
use emcee_core::{ChannelAdapter, ProviderAdapter};
use emcee_filter::QualityFilter;
use emcee_router::{RateLimiter, Router};
use emcee_storage::models::StoredMessage;
use emcee_storage::queries::messages;
use emcee_storage::{Database, ProfileStore, ResponseArchive};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Recent messages handed to the relevance classifier as context.
const CLASSIFIER_CONTEXT_LIMIT: usize = 10;

/// Topics included in a user's profile summary.
const SUMMARY_TOPIC_LIMIT: usize = 5;

/// The main agent loop wiring the gate, composer, filter, and stores together.
pub struct AgentLoop {
    channel: Box<dyn ChannelAdapter + Send + Sync>,
    router: Router,
    composer: Composer,
    filter: QualityFilter,
    profiles: ProfileStore,
    archive: ResponseArchive,
    limiter: RateLimiter,
    db: Database,
    config: EmceeConfig,
}

impl AgentLoop {
    /// Creates the agent loop and hydrates today's rate counters for every
    /// configured community.
    pub async fn new(
        channel: Box<dyn ChannelAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
        db: Database,
        config: EmceeConfig,
    ) -> Result<Self, EmceeError> {
        let call_timeout = Duration::from_secs(config.anthropic.request_timeout_secs);

        let router = Router::new(
            config.router.clone(),
            config.agent.name.clone(),
            config.agent.owner_id.clone(),
            call_timeout,
            provider.clone(),
        );
        let composer = Composer::new(
            config.composer.clone(),
            config.persona.clone(),
            config.agent.name.clone(),
            call_timeout,
            provider.clone(),
        );
        let filter = QualityFilter::new(config.filter.clone(), call_timeout, provider);

        let profiles = ProfileStore::new(db.clone(), &config.topics);
        let archive = ResponseArchive::new(db.clone());

        let mut limiter = RateLimiter::new(db.clone());
        let now = Utc::now();
        for community in &config.communities {
            limiter.hydrate(&community.server_id, now).await?;
        }

        info!(
            agent_name = config.agent.name.as_str(),
            communities = config.communities.len(),
            "agent loop initialized"
        );

        Ok(Self {
            channel,
            router,
            composer,
            filter,
            profiles,
            archive,
            limiter,
            db,
            config,
        })
    }

    /// Runs the loop until the channel closes or the token is cancelled.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), EmceeError> {
        self.channel.connect().await?;
        info!("agent loop running");

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(ChannelEvent::Message(msg)) => {
                            if let Err(e) = self.handle_message(msg).await {
                                error!(error = %e, "failed to handle message");
                            }
                        }
                        Ok(ChannelEvent::Reaction(reaction)) => {
                            if let Err(e) = self.handle_reaction(reaction).await {
                                error!(error = %e, "failed to handle reaction");
                            }
                        }
                        Ok(ChannelEvent::Closed) => {
                            info!("channel closed, stopping agent loop");
                            break;
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error, stopping agent loop");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        if let Err(e) = self.channel.shutdown().await {
            warn!(error = %e, "channel shutdown failed");
        }
        self.db.close().await?;
        info!("agent loop stopped");
        Ok(())
    }

    /// The full inbound pipeline: record, gate, compose, filter, send, learn.
    async fn handle_message(&mut self, msg: InboundMessage) -> Result<(), EmceeError> {
        // Echoes of the agent's own sends are recorded at send time.
        if msg.is_from_agent {
            return Ok(());
        }

        let now = Utc::now();

        // Observation is unconditional and best-effort: the message log and
        // the author's profile grow even when the agent stays silent.
        if let Err(e) = messages::insert_message(&self.db, &stored_inbound(&msg)).await {
            warn!(error = %e, "failed to persist message, continuing");
        }
        if let Err(e) = self
            .profiles
            .record_message(&msg.author_id, &msg.server_id, &msg.text, now)
            .await
        {
            warn!(error = %e, "failed to update profile, continuing");
        }

        let community = self.config.community(&msg.server_id);
        let recent_context = match messages::recent_for_channel(
            &self.db,
            &msg.channel_id,
            CLASSIFIER_CONTEXT_LIMIT,
        )
        .await
        {
            Ok(recent) => recent
                .iter()
                .map(|m| format!("[{}]: {}", m.author_id, m.content))
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to load classifier context, continuing without");
                Vec::new()
            }
        };

        let daily_limit = self.config.daily_limit_for(&msg.server_id);
        let decision = self
            .router
            .should_respond(&msg, community, &mut self.limiter, daily_limit, &recent_context, now)
            .await;

        info!(
            server_id = msg.server_id.as_str(),
            channel_id = msg.channel_id.as_str(),
            author_id = msg.author_id.as_str(),
            respond = decision.respond,
            reason = %decision.reason,
            "route decision"
        );

        if !decision.respond {
            return Ok(());
        }
        let Some(community) = community else {
            return Ok(());
        };

        let profile = match self
            .profiles
            .summary(&msg.author_id, &msg.server_id, SUMMARY_TOPIC_LIMIT)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "failed to load profile summary, composing without");
                Default::default()
            }
        };
        let history = messages::recent_for_channel(
            &self.db,
            &msg.channel_id,
            self.composer.history_limit(),
        )
        .await
        .unwrap_or_default();
        let exemplars = self
            .archive
            .top_scored(&msg.server_id, self.composer.exemplar_limit())
            .await
            .unwrap_or_default();

        let Some(draft) = self
            .composer
            .compose(&msg, community, &profile, &history, &exemplars)
            .await
        else {
            debug!(channel_id = msg.channel_id.as_str(), "nothing composed, staying silent");
            return Ok(());
        };

        if draft.source == DraftSource::Generated && !self.filter.accept(&draft.text).await {
            warn!(
                channel_id = msg.channel_id.as_str(),
                "draft rejected by quality filter, staying silent"
            );
            return Ok(());
        }

        let sent_id = self
            .channel
            .send_reply(OutboundReply {
                channel_id: msg.channel_id.clone(),
                text: draft.text.clone(),
                reply_to: Some(msg.id.clone()),
            })
            .await?;

        // Learning writes are best-effort; the reply is already out.
        if let Err(e) = messages::insert_message(
            &self.db,
            &stored_outbound(&msg, &sent_id.0, &draft.text, &self.config.agent.name, now),
        )
        .await
        {
            warn!(error = %e, "failed to persist sent reply");
        }
        if let Err(e) = self
            .archive
            .record(&msg.text, &draft.text, &msg.server_id, &sent_id.0, now)
            .await
        {
            warn!(error = %e, "failed to archive sent reply");
        }
        if let Err(e) = self
            .profiles
            .record_interaction(&msg.author_id, &msg.server_id, now)
            .await
        {
            warn!(error = %e, "failed to bump interaction count");
        }
        if let Err(e) = self
            .limiter
            .record_response(&msg.server_id, &msg.channel_id, now)
            .await
        {
            // In-memory state is already charged; only the durable copy lagged.
            warn!(error = %e, "failed to persist rate counter");
        }

        info!(
            channel_id = msg.channel_id.as_str(),
            author_id = msg.author_id.as_str(),
            reason = %decision.reason,
            "replied"
        );
        Ok(())
    }

    /// Maps a reaction on one of the agent's replies to a score change.
    async fn handle_reaction(&self, reaction: ReactionEvent) -> Result<(), EmceeError> {
        let Some(delta) = feedback::score_delta(&reaction.emoji) else {
            return Ok(());
        };
        let Some(response) = self.archive.find_by_message_id(&reaction.message_id.0).await? else {
            // A reaction on an ordinary message, not one of ours.
            return Ok(());
        };

        let changed = self
            .archive
            .apply_reaction(
                &response.id,
                &reaction.user_id,
                &reaction.emoji,
                delta,
                reaction.action,
                Utc::now(),
            )
            .await?;

        if changed {
            info!(
                response_id = response.id.as_str(),
                emoji = reaction.emoji.as_str(),
                delta,
                action = ?reaction.action,
                "feedback applied"
            );
        }
        Ok(())
    }
}

/// Maps an observed inbound message to its stored form.
fn stored_inbound(msg: &InboundMessage) -> StoredMessage {
    StoredMessage {
        id: msg.id.0.clone(),
        server_id: msg.server_id.clone(),
        channel_id: msg.channel_id.clone(),
        author_id: msg.author_id.clone(),
        content: msg.text.clone(),
        is_from_agent: false,
        reply_to_id: None,
        created_at: msg.timestamp.to_rfc3339(),
    }
}

/// Maps a sent reply to its stored form.
fn stored_outbound(
    trigger: &InboundMessage,
    sent_id: &str,
    text: &str,
    agent_name: &str,
    now: chrono::DateTime<Utc>,
) -> StoredMessage {
    StoredMessage {
        id: sent_id.to_string(),
        server_id: trigger.server_id.clone(),
        channel_id: trigger.channel_id.clone(),
        author_id: agent_name.to_string(),
        content: text.to_string(),
        is_from_agent: true,
        reply_to_id: Some(trigger.id.0.clone()),
        created_at: now.to_rfc3339(),
    }
}
