// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios through the full pipeline: mock channel and provider,
//! real gate, composer, filter, stores, and rate limiter over a scratch
//! database.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use emcee_agent::AgentLoop;
use emcee_config::EmceeConfig;
use emcee_config::model::{CommunityConfig, FaqEntry};
use emcee_core::types::{InboundMessage, MessageId, ReactionAction, ReactionEvent};
use emcee_storage::queries::messages;
use emcee_storage::{Database, ProfileStore, ResponseArchive};
use emcee_test_utils::{MockChannel, MockProvider};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn test_config() -> EmceeConfig {
    let mut config = EmceeConfig::default();
    config.agent.owner_id = "u-owner".to_string();
    config.anthropic.request_timeout_secs = 1;
    config.communities = vec![CommunityConfig {
        server_id: "srv-1".to_string(),
        name: "Creators".to_string(),
        ignored_channels: vec!["chan-ignored".to_string()],
        faq: vec![FaqEntry {
            patterns: vec!["how to access".to_string(), "access the course".to_string()],
            answer: "Log in at the portal and open Courses.".to_string(),
        }],
        ..Default::default()
    }];
    config
        .topics
        .keywords
        .insert("access".to_string(), "platform-access".to_string());
    config
        .topics
        .keywords
        .insert("course".to_string(), "training-content".to_string());
    config
}

fn member_message(id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id.to_string()),
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

fn reaction(message_id: &str, user: &str, emoji: &str) -> ReactionEvent {
    ReactionEvent {
        message_id: MessageId(message_id.to_string()),
        emoji: emoji.to_string(),
        user_id: user.to_string(),
        action: ReactionAction::Added,
    }
}

/// Builds the agent over a scratch database, runs the injected script to
/// completion, and hands back the database for assertions.
async fn run_scenario(
    channel: &MockChannel,
    provider: Arc<MockProvider>,
    config: EmceeConfig,
) -> (Database, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("e2e.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

    let mut agent = AgentLoop::new(Box::new(channel.clone()), provider, db.clone(), config)
        .await
        .unwrap();
    channel.close_channel().await;
    agent.run(CancellationToken::new()).await.unwrap();

    (db, dir)
}

// Scenario A: the owner sends "?" in an ignored channel. The ignore list
// beats the owner bypass; nothing is sent and nothing external is called.
#[tokio::test]
async fn scenario_a_ignore_list_beats_owner_bypass() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::new());

    let mut msg = member_message("m-1", "?");
    msg.author_id = "u-owner".to_string();
    msg.channel_id = "chan-ignored".to_string();
    channel.inject_message(msg).await;

    let (_db, _dir) = run_scenario(&channel, provider.clone(), test_config()).await;

    assert_eq!(channel.sent_count().await, 0);
    assert_eq!(provider.generate_calls().await, 0);
    assert_eq!(provider.classify_calls().await, 0);
}

// Scenario B: a member asks a known FAQ question in an active channel with
// quota available. The gate answers via the question rule, the composer
// matches the FAQ pattern, and generation is never invoked.
#[tokio::test]
async fn scenario_b_faq_question_answered_without_generation() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::new());

    channel
        .inject_message(member_message(
            "m-1",
            "does anyone know how to access the course",
        ))
        .await;

    let (_db, _dir) = run_scenario(&channel, provider.clone(), test_config()).await;

    let sent = channel.sent_replies().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Log in at the portal and open Courses.");
    assert_eq!(provider.generate_calls().await, 0);
    assert_eq!(provider.classify_calls().await, 0);
}

// Scenario C: a sent reply receives three thumbs-up and one thumbs-down
// from distinct users. The final score is +2.
#[tokio::test]
async fn scenario_c_reactions_net_out_to_plus_two() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::with_generations(vec![
        "replay is up, check the portal".to_string(),
    ]));

    let mut msg = member_message("m-1", "is the replay up yet");
    msg.mentions_agent = true;
    channel.inject_message(msg).await;

    // The reply gets the deterministic id mock-sent-1.
    for user in ["u-a", "u-b", "u-c"] {
        channel.inject_reaction(reaction("mock-sent-1", user, "👍")).await;
    }
    channel.inject_reaction(reaction("mock-sent-1", "u-d", "👎")).await;

    let (db, _dir) = run_scenario(&channel, provider, test_config()).await;

    let archive = ResponseArchive::new(db);
    let top = archive.top_scored("srv-1", 1).await.unwrap();
    assert_eq!(top[0].score, 2);
}

// Scenario D: the generation call times out. No message is sent, nothing is
// archived, but the inbound message and its topics were still recorded.
#[tokio::test]
async fn scenario_d_generation_timeout_still_learns_topics() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::new());
    provider.set_delay(Duration::from_secs(5)).await;

    let mut msg = member_message("m-1", "my course access is broken, can you look");
    msg.mentions_agent = true;
    channel.inject_message(msg).await;

    let config = test_config();
    let (db, _dir) = run_scenario(&channel, provider, config.clone()).await;

    assert_eq!(channel.sent_count().await, 0);

    let archive = ResponseArchive::new(db.clone());
    assert!(archive.top_scored("srv-1", 10).await.unwrap().is_empty());

    let log = messages::recent_for_channel(&db, "chan-general", 10)
        .await
        .unwrap();
    assert_eq!(log.len(), 1);

    let profiles = ProfileStore::new(db, &config.topics);
    let summary = profiles.summary("u-member", "srv-1", 5).await.unwrap();
    let topics: Vec<&str> = summary.top_topics.iter().map(|t| t.topic.as_str()).collect();
    assert!(topics.contains(&"platform-access"));
    assert!(topics.contains(&"training-content"));
}

// A mention gets a reply even when the daily quota is exhausted and the
// channel is cooling down.
#[tokio::test]
async fn mention_bypasses_exhausted_quota() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::with_generations(vec![
        "here you go".to_string(),
        "and again".to_string(),
    ]));

    let mut config = test_config();
    config.communities[0].daily_limit_override = Some(1);

    // First mention consumes the whole quota.
    let mut first = member_message("m-1", "ping @emcee");
    first.mentions_agent = true;
    channel.inject_message(first).await;

    // Second mention in the same channel: quota gone, cooldown active,
    // still replied to.
    let mut second = member_message("m-2", "one more thing @emcee");
    second.mentions_agent = true;
    channel.inject_message(second).await;

    let (_db, _dir) = run_scenario(&channel, provider, config).await;

    assert_eq!(channel.sent_count().await, 2);
}

// Ambient chatter is silenced once the quota is spent, without consulting
// the classifier.
#[tokio::test]
async fn ambient_chatter_respects_quota_and_cooldown() {
    let channel = MockChannel::new();
    // First ambient message: classifier votes relevant, a reply goes out.
    let provider = Arc::new(MockProvider::with_verdicts(vec![true]));
    provider.push_generation("welcome aboard").await;

    let mut config = test_config();
    config.communities[0].daily_limit_override = Some(1);

    channel
        .inject_message(member_message("m-1", "just joined from the webinar"))
        .await;
    // Second ambient message: quota is now exhausted; the classifier must
    // not even be asked.
    channel
        .inject_message(member_message("m-2", "the intro video was nice"))
        .await;

    let (_db, _dir) = run_scenario(&channel, provider.clone(), config).await;

    assert_eq!(channel.sent_count().await, 1);
    assert_eq!(provider.classify_calls().await, 2, "relevance + naturalness for the first message only");
}

// A reply that fails the quality filter is discarded: nothing sent, nothing
// archived, quota untouched.
#[tokio::test]
async fn rejected_draft_charges_nothing() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::with_generations(vec![
        "Great question! I'd be happy to help with that.".to_string(),
        "short honest answer".to_string(),
    ]));
    provider.push_verdict(true).await; // relevance of the second message
    provider.push_verdict(true).await; // naturalness of its draft

    let mut config = test_config();
    config.communities[0].daily_limit_override = Some(1);

    let mut first = member_message("m-1", "what changed in module 3 @emcee");
    first.mentions_agent = true;
    channel.inject_message(first).await;

    // The rejected draft must not have consumed the quota or started a
    // cooldown: a follow-up ambient message still fits under the limit of
    // one and reaches the classifier.
    channel
        .inject_message(member_message("m-2", "module 3 looks different now"))
        .await;

    let (db, _dir) = run_scenario(&channel, provider, config).await;

    let sent = channel.sent_replies().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "short honest answer");

    let archive = ResponseArchive::new(db);
    let archived = archive.top_scored("srv-1", 10).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].response_text, "short honest answer");
}

// Reacting twice with the same emoji from the same user counts once, and a
// removal restores the previous score.
#[tokio::test]
async fn feedback_is_idempotent_and_reversible() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::with_generations(vec!["np".to_string()]));

    let mut msg = member_message("m-1", "thanks @emcee");
    msg.mentions_agent = true;
    channel.inject_message(msg).await;

    channel.inject_reaction(reaction("mock-sent-1", "u-a", "🔥")).await;
    channel.inject_reaction(reaction("mock-sent-1", "u-a", "🔥")).await;
    channel
        .inject_reaction(ReactionEvent {
            message_id: MessageId("mock-sent-1".to_string()),
            emoji: "🔥".to_string(),
            user_id: "u-a".to_string(),
            action: ReactionAction::Removed,
        })
        .await;

    let (db, _dir) = run_scenario(&channel, provider, test_config()).await;

    let archive = ResponseArchive::new(db);
    let top = archive.top_scored("srv-1", 1).await.unwrap();
    assert_eq!(top[0].score, 0);
}

// A highly-scored past reply is injected into later generation requests as
// a style exemplar.
#[tokio::test]
async fn learned_replies_feed_later_prompts() {
    let channel = MockChannel::new();
    let provider = Arc::new(MockProvider::with_generations(vec![
        "replay link is pinned".to_string(),
        "second reply".to_string(),
    ]));

    let mut first = member_message("m-1", "where's the replay @emcee");
    first.mentions_agent = true;
    channel.inject_message(first).await;
    channel.inject_reaction(reaction("mock-sent-1", "u-a", "👍")).await;

    let mut second = member_message("m-2", "what about the slides @emcee");
    second.mentions_agent = true;
    channel.inject_message(second).await;

    let (_db, _dir) = run_scenario(&channel, provider.clone(), test_config()).await;

    let request = provider.last_request().await.unwrap();
    assert!(
        request.system_prompt.contains("replay link is pinned"),
        "the upvoted reply should appear as an exemplar"
    );
}
