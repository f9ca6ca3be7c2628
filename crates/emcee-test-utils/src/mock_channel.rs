// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound replies for assertion in tests. Sent message ids
//! are deterministic (`mock-sent-1`, `mock-sent-2`, ...) so tests can aim
//! reaction events at specific replies.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use emcee_core::traits::adapter::PluginAdapter;
use emcee_core::traits::channel::ChannelAdapter;
use emcee_core::types::{
    AdapterType, ChannelEvent, HealthStatus, InboundMessage, MessageId, OutboundReply,
    ReactionEvent,
};
use emcee_core::EmceeError;

/// A mock chat platform for testing.
///
/// Provides two queues:
/// - **inbound**: events injected via `inject()` are returned by `receive()`
/// - **sent**: replies passed to `send_reply()` are captured and retrievable
///   via `sent_replies()`
///
/// Clones share the same queues, so a test can keep a handle while the
/// agent loop owns the boxed adapter.
#[derive(Clone)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<ChannelEvent>>>,
    sent: Arc<Mutex<Vec<OutboundReply>>>,
    notify: Arc<Notify>,
    send_counter: Arc<Mutex<u64>>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            send_counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Inject an event into the receive queue.
    pub async fn inject(&self, event: ChannelEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Inject an inbound message event.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inject(ChannelEvent::Message(msg)).await;
    }

    /// Inject a reaction event.
    pub async fn inject_reaction(&self, reaction: ReactionEvent) {
        self.inject(ChannelEvent::Reaction(reaction)).await;
    }

    /// Inject the close event; the next `receive()` after the queue drains
    /// delivers it and the agent loop exits.
    pub async fn close_channel(&self) {
        self.inject(ChannelEvent::Closed).await;
    }

    /// All replies sent through `send_reply()`.
    pub async fn sent_replies(&self) -> Vec<OutboundReply> {
        self.sent.lock().await.clone()
    }

    /// Number of replies sent so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
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
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), EmceeError> {
        Ok(())
    }

    async fn send_reply(&self, reply: OutboundReply) -> Result<MessageId, EmceeError> {
        let mut counter = self.send_counter.lock().await;
        *counter += 1;
        let id = format!("mock-sent-{}", *counter);
        self.sent.lock().await.push(reply);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<ChannelEvent, EmceeError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            // Wait for notification that a new event was injected.
            self.notify.notified().await;
        }
    }
}
