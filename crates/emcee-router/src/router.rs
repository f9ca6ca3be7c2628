// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reply gate: decides whether an observed message deserves a reply.
//!
//! Rules run first and are free; only ambient messages that survive every
//! rule spend a classification call. The decision is pure: counters are
//! charged by the caller after an actual send, so suppressed replies never
//! consume quota.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use emcee_config::model::{CommunityConfig, RouterConfig};
use emcee_core::{InboundMessage, ProviderAdapter};
use strum::Display;
use tracing::{debug, warn};

use crate::heuristics::is_question;
use crate::limiter::RateLimiter;

/// Why the gate decided the way it did. Logged with every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RouteReason {
    OwnMessage,
    UnconfiguredServer,
    IgnoredChannel,
    InactiveChannel,
    Mentioned,
    RepliedTo,
    Owner,
    Question,
    QuotaExhausted,
    Cooldown,
    ClassifiedRelevant,
    NotRelevant,
    ClassifierUnavailable,
    ClassifierDisabled,
}

/// The gate's verdict for one message.
#[derive(Debug, Clone, Copy)]
pub struct RouteDecision {
    pub respond: bool,
    pub reason: RouteReason,
}

impl RouteDecision {
    fn yes(reason: RouteReason) -> Self {
        Self {
            respond: true,
            reason,
        }
    }

    fn no(reason: RouteReason) -> Self {
        Self {
            respond: false,
            reason,
        }
    }
}

/// Decides, for each observed message, whether the agent should reply.
pub struct Router {
    config: RouterConfig,
    agent_name: String,
    owner_id: String,
    classify_timeout: Duration,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
}

impl Router {
    pub fn new(
        config: RouterConfig,
        agent_name: String,
        owner_id: String,
        classify_timeout: Duration,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
    ) -> Self {
        Self {
            config,
            agent_name,
            owner_id,
            classify_timeout,
            provider,
        }
    }

    /// The decision ladder, first match wins.
    ///
    /// The ignore list dominates everything, including mentions and the
    /// owner bypass. Mentions, replies to the agent, the owner, and
    /// detected questions bypass quota and cooldown. Everything else is
    /// ambient chatter: it must clear quota and cooldown, and then an
    /// external relevance judgment decides. A failed or timed-out judgment
    /// means staying silent (fail-closed).
    #[allow(clippy::too_many_arguments)]
    pub async fn should_respond(
        &self,
        msg: &InboundMessage,
        community: Option<&CommunityConfig>,
        limiter: &mut RateLimiter,
        daily_limit: u32,
        recent_context: &[String],
        now: DateTime<Utc>,
    ) -> RouteDecision {
        if msg.is_from_agent {
            return RouteDecision::no(RouteReason::OwnMessage);
        }

        let Some(community) = community else {
            return RouteDecision::no(RouteReason::UnconfiguredServer);
        };

        if community
            .ignored_channels
            .iter()
            .any(|c| c == &msg.channel_id)
        {
            return RouteDecision::no(RouteReason::IgnoredChannel);
        }

        if !community.active_channels.is_empty()
            && !community.active_channels.iter().any(|c| c == &msg.channel_id)
        {
            return RouteDecision::no(RouteReason::InactiveChannel);
        }

        if msg.mentions_agent {
            return RouteDecision::yes(RouteReason::Mentioned);
        }
        if msg.is_reply_to_agent {
            return RouteDecision::yes(RouteReason::RepliedTo);
        }

        if !self.owner_id.is_empty() && msg.author_id == self.owner_id {
            return RouteDecision::yes(RouteReason::Owner);
        }

        if is_question(&msg.text, &self.config.question_keywords) {
            return RouteDecision::yes(RouteReason::Question);
        }

        if !limiter.can_respond(&msg.server_id, daily_limit, now) {
            return RouteDecision::no(RouteReason::QuotaExhausted);
        }

        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        if limiter.in_cooldown(&msg.channel_id, cooldown, now) {
            return RouteDecision::no(RouteReason::Cooldown);
        }

        if !self.config.classify_ambient {
            return RouteDecision::no(RouteReason::ClassifierDisabled);
        }

        let prompt = relevance_prompt(&self.agent_name, community, &msg.text, recent_context);
        match tokio::time::timeout(self.classify_timeout, self.provider.classify(&prompt)).await {
            Ok(Ok(true)) => {
                debug!(channel_id = msg.channel_id.as_str(), "classifier voted relevant");
                RouteDecision::yes(RouteReason::ClassifiedRelevant)
            }
            Ok(Ok(false)) => RouteDecision::no(RouteReason::NotRelevant),
            Ok(Err(e)) => {
                warn!(error = %e, "relevance classification failed, staying silent");
                RouteDecision::no(RouteReason::ClassifierUnavailable)
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.classify_timeout.as_secs(),
                    "relevance classification timed out, staying silent"
                );
                RouteDecision::no(RouteReason::ClassifierUnavailable)
            }
        }
    }
}

/// Builds the yes/no relevance prompt for an ambient message.
fn relevance_prompt(
    agent_name: &str,
    community: &CommunityConfig,
    text: &str,
    recent_context: &[String],
) -> String {
    let community_name = if community.name.is_empty() {
        "the community"
    } else {
        community.name.as_str()
    };
    let context = if recent_context.is_empty() {
        "(no recent messages)".to_string()
    } else {
        recent_context.join("\n")
    };

    format!(
        "{agent_name} is the community manager of {community_name}. Decide whether \
         {agent_name} should reply to the new message below.\n\
         \n\
         Reply YES when:\n\
         - it is a direct question about the community, its schedule, or its platform\n\
         - someone asks for help or reports a problem\n\
         - someone greets or thanks {agent_name} and nobody has answered\n\
         - it is a support issue\n\
         \n\
         Reply NO when:\n\
         - members are talking among themselves and need no input\n\
         - someone shares a link or resource without asking anything\n\
         - another admin or member already answered\n\
         - the message is filler (a lone emoji, \"ok\")\n\
         \n\
         Recent channel messages:\n\
         {context}\n\
         \n\
         New message: \"{text}\"\n\
         \n\
         Answer with exactly YES or NO."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use emcee_core::MessageId;
    use emcee_storage::Database;
    use emcee_test_utils::MockProvider;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn community() -> CommunityConfig {
        CommunityConfig {
            server_id: "srv-1".to_string(),
            name: "Creators".to_string(),
            ignored_channels: vec!["chan-ignored".to_string()],
            ..Default::default()
        }
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId("m-1".to_string()),
            server_id: "srv-1".to_string(),
            channel_id: "chan-general".to_string(),
            author_id: "u-member".to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            mentions_agent: false,
            is_reply_to_agent: false,
            is_from_agent: false,
        }
    }

    fn router(provider: Arc<MockProvider>) -> Router {
        Router::new(
            RouterConfig::default(),
            "emcee".to_string(),
            "u-owner".to_string(),
            TIMEOUT,
            provider,
        )
    }

    async fn limiter() -> (RateLimiter, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let limiter = RateLimiter::new(db.clone());
        (limiter, db, dir)
    }

    #[tokio::test]
    async fn mention_bypasses_quota_and_cooldown() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider.clone());
        let (mut limiter, db, _dir) = limiter().await;
        let now = Utc::now();
        let community = community();

        // Exhaust quota and start a cooldown.
        limiter.record_response("srv-1", "chan-general", now).await.unwrap();

        let mut msg = message("status update, nothing urgent");
        msg.mentions_agent = true;
        let decision = router
            .should_respond(&msg, Some(&community), &mut limiter, 1, &[], now)
            .await;
        assert!(decision.respond);
        assert_eq!(decision.reason, RouteReason::Mentioned);
        assert_eq!(provider.classify_calls().await, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reply_to_agent_gets_a_reply() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let mut msg = message("thanks, that fixed it");
        msg.is_reply_to_agent = true;
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(decision.respond);
        assert_eq!(decision.reason, RouteReason::RepliedTo);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn owner_always_gets_a_reply() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let mut msg = message("morning");
        msg.author_id = "u-owner".to_string();
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(decision.respond);
        assert_eq!(decision.reason, RouteReason::Owner);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ignored_channel_beats_owner_and_mention() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let mut msg = message("?");
        msg.channel_id = "chan-ignored".to_string();
        msg.author_id = "u-owner".to_string();
        msg.mentions_agent = true;
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::IgnoredChannel);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn active_channel_allowlist_excludes_other_channels() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let mut community = community();
        community.active_channels = vec!["chan-help".to_string()];

        let msg = message("does anyone know the schedule");
        let decision = router
            .should_respond(&msg, Some(&community), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::InactiveChannel);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn question_is_answered_without_classifier() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider.clone());
        let (mut limiter, db, _dir) = limiter().await;

        let msg = message("does anyone know how to access the course");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(decision.respond);
        assert_eq!(decision.reason, RouteReason::Question);
        assert_eq!(provider.classify_calls().await, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn exhausted_quota_silences_ambient_chatter() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider.clone());
        let (mut limiter, db, _dir) = limiter().await;
        let now = Utc::now();

        limiter.record_response("srv-1", "chan-other", now).await.unwrap();

        let msg = message("big launch day today");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 1, &[], now)
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::QuotaExhausted);
        assert_eq!(provider.classify_calls().await, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cooldown_silences_ambient_chatter_in_channel() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;
        let now = Utc::now();

        limiter.record_response("srv-1", "chan-general", now).await.unwrap();

        let msg = message("big launch day today");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], now)
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::Cooldown);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn classifier_verdict_decides_ambient_messages() {
        let provider = Arc::new(MockProvider::with_verdicts(vec![true, false]));
        let router = router(provider.clone());
        let (mut limiter, db, _dir) = limiter().await;

        let msg = message("the portal keeps logging me out");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(decision.respond);
        assert_eq!(decision.reason, RouteReason::ClassifiedRelevant);

        let msg = message("lol same");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::NotRelevant);
        assert_eq!(provider.classify_calls().await, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn classifier_failure_fails_closed() {
        let provider = Arc::new(MockProvider::new());
        provider.fail_classify(true).await;
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let msg = message("hmm interesting point");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::ClassifierUnavailable);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn classifier_timeout_fails_closed() {
        let provider = Arc::new(MockProvider::new());
        provider.set_delay(Duration::from_secs(5)).await;
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let msg = message("hmm interesting point");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::ClassifierUnavailable);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_classifier_ignores_ambient_chatter() {
        let provider = Arc::new(MockProvider::new());
        let mut config = RouterConfig::default();
        config.classify_ambient = false;
        let router = Router::new(
            config,
            "emcee".to_string(),
            "u-owner".to_string(),
            TIMEOUT,
            provider.clone(),
        );
        let (mut limiter, db, _dir) = limiter().await;

        let msg = message("nice weather");
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::ClassifierDisabled);
        assert_eq!(provider.classify_calls().await, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn own_messages_and_unknown_servers_are_skipped() {
        let provider = Arc::new(MockProvider::new());
        let router = router(provider);
        let (mut limiter, db, _dir) = limiter().await;

        let mut msg = message("echo of my own reply?");
        msg.is_from_agent = true;
        let decision = router
            .should_respond(&msg, Some(&community()), &mut limiter, 15, &[], Utc::now())
            .await;
        assert_eq!(decision.reason, RouteReason::OwnMessage);

        let msg = message("anyone here?");
        let decision = router
            .should_respond(&msg, None, &mut limiter, 15, &[], Utc::now())
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.reason, RouteReason::UnconfiguredServer);

        db.close().await.unwrap();
    }

    #[test]
    fn relevance_prompt_names_agent_and_community() {
        let prompt = relevance_prompt(
            "emcee",
            &community(),
            "is the call at 5?",
            &["[maya]: hi all".to_string()],
        );
        assert!(prompt.contains("emcee is the community manager of Creators"));
        assert!(prompt.contains("[maya]: hi all"));
        assert!(prompt.contains("\"is the call at 5?\""));
    }
}
