// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `emcee shell` command implementation.
//!
//! Launches an interactive REPL that acts as a real channel adapter: typed
//! lines become inbound messages, agent replies print to stdout, and
//! `/react` commands become reaction events, so the entire pipeline (gate,
//! composer, filter, archive, rate limiter) runs exactly as it would
//! against a chat platform.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use colored::Colorize;
use emcee_agent::AgentLoop;
use emcee_anthropic::AnthropicProvider;
use emcee_config::EmceeConfig;
use emcee_config::model::CommunityConfig;
use emcee_core::error::EmceeError;
use emcee_core::types::{
    AdapterType, ChannelEvent, HealthStatus, InboundMessage, MessageId, OutboundReply,
    ReactionAction, ReactionEvent,
};
use emcee_core::{ChannelAdapter, PluginAdapter, ProviderAdapter};
use emcee_storage::Database;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Server id used when no community is configured.
const SHELL_SERVER_ID: &str = "shell";

/// Channel id every shell message lands in.
const SHELL_CHANNEL_ID: &str = "shell";

/// Runs the `emcee shell` interactive session.
pub async fn run_shell(mut config: EmceeConfig) -> Result<(), EmceeError> {
    let db = Database::open(&config.storage.database_path).await?;

    let provider: Arc<dyn ProviderAdapter + Send + Sync> = Arc::new(
        AnthropicProvider::new(&config.anthropic).inspect_err(|_| {
            eprintln!(
                "error: Anthropic API key required. Set anthropic.api_key in emcee.toml or the ANTHROPIC_API_KEY env var."
            );
        })?,
    );

    // The shell talks to the first configured community; without one, a
    // bare community is added so the gate has something to route against.
    let server_id = match config.communities.first() {
        Some(community) => community.server_id.clone(),
        None => {
            config.communities.push(CommunityConfig {
                server_id: SHELL_SERVER_ID.to_string(),
                name: "shell".to_string(),
                ..Default::default()
            });
            SHELL_SERVER_ID.to_string()
        }
    };

    println!("{}", "emcee shell".bold().green());
    println!(
        "Lines you type are channel messages. {} rates a reply, {} exits.\n",
        "/react <n> <emoji>".yellow(),
        "/quit".yellow()
    );

    let channel = ShellChannel::start(server_id);
    let mut agent = AgentLoop::new(Box::new(channel), provider, db, config).await?;
    agent.run(CancellationToken::new()).await?;

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// A channel adapter backed by a readline loop on a plain thread.
///
/// The reader thread parses lines into events and hands them over an mpsc
/// queue; dropping the sender (on `/quit`, Ctrl-C, or Ctrl-D) surfaces as
/// [`ChannelEvent::Closed`].
struct ShellChannel {
    events: Mutex<mpsc::Receiver<ChannelEvent>>,
    sent_counter: AtomicU64,
}

impl ShellChannel {
    /// Spawns the reader thread and returns the adapter.
    fn start(server_id: String) -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || read_lines(server_id, tx));
        Self {
            events: Mutex::new(rx),
            sent_counter: AtomicU64::new(0),
        }
    }
}

/// The blocking readline loop feeding the event queue.
fn read_lines(server_id: String, tx: mpsc::Sender<ChannelEvent>) {
    let Ok(mut rl) = DefaultEditor::new() else {
        eprintln!("{}", "error: failed to initialize readline".red());
        return;
    };

    let mut counter: u64 = 0;
    let prompt = format!("{}> ", "you".green());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let event = match parse_react_command(trimmed) {
                    Some(Ok(reaction)) => ChannelEvent::Reaction(reaction),
                    Some(Err(usage)) => {
                        eprintln!("{}", usage.yellow());
                        continue;
                    }
                    None => {
                        counter += 1;
                        ChannelEvent::Message(InboundMessage {
                            id: MessageId(format!("shell-{counter}")),
                            server_id: server_id.clone(),
                            channel_id: SHELL_CHANNEL_ID.to_string(),
                            author_id: "local".to_string(),
                            text: trimmed.to_string(),
                            timestamp: Utc::now(),
                            mentions_agent: false,
                            is_reply_to_agent: false,
                            is_from_agent: false,
                        })
                    }
                };

                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }
    // Dropping the sender closes the channel; the agent loop sees Closed.
}

/// Parses `/react <n> <emoji>` into a reaction on reply number `n`.
fn parse_react_command(line: &str) -> Option<Result<ReactionEvent, &'static str>> {
    let rest = line.strip_prefix("/react")?;
    let mut parts = rest.split_whitespace();
    let (Some(n), Some(emoji)) = (parts.next(), parts.next()) else {
        return Some(Err("usage: /react <reply number> <emoji>"));
    };
    if n.parse::<u64>().is_err() {
        return Some(Err("usage: /react <reply number> <emoji>"));
    }
    Some(Ok(ReactionEvent {
        message_id: MessageId(format!("shell-reply-{n}")),
        emoji: emoji.to_string(),
        user_id: "local".to_string(),
        action: ReactionAction::Added,
    }))
}

#[async_trait]
impl PluginAdapter for ShellChannel {
    fn name(&self) -> &str {
        "shell"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, EmceeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), EmceeError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for ShellChannel {
    async fn connect(&mut self) -> Result<(), EmceeError> {
        Ok(())
    }

    async fn send_reply(&self, reply: OutboundReply) -> Result<MessageId, EmceeError> {
        let n = self.sent_counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("{} {} {}", "emcee>".cyan().bold(), reply.text, format!("[#{n}]").dimmed());
        info!(reply_number = n, "shell reply delivered");
        Ok(MessageId(format!("shell-reply-{n}")))
    }

    async fn receive(&self) -> Result<ChannelEvent, EmceeError> {
        let mut events = self.events.lock().await;
        Ok(events.recv().await.unwrap_or(ChannelEvent::Closed))
    }
}
