// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat platform integrations.

use async_trait::async_trait;

use crate::error::EmceeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelEvent, MessageId, OutboundReply};

/// Adapter for the chat platform the agent lives in.
///
/// A channel adapter delivers observed messages and reaction events, and
/// carries the agent's replies back to the platform.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the chat platform.
    async fn connect(&mut self) -> Result<(), EmceeError>;

    /// Sends a reply into a channel, returning the platform id of the sent
    /// message so later reaction events can be resolved against it.
    async fn send_reply(&self, reply: OutboundReply) -> Result<MessageId, EmceeError>;

    /// Receives the next event (message, reaction, or close) from the platform.
    async fn receive(&self) -> Result<ChannelEvent, EmceeError>;
}
