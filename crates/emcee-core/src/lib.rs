// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the emcee community-management agent.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the emcee workspace. The channel and LLM
//! provider seams are defined here as adapter traits.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::EmceeError;
pub use types::{
    AdapterType, ChannelEvent, GenerationRequest, HealthStatus, InboundMessage, MessageId,
    OutboundReply, ReactionAction, ReactionEvent, TranscriptLine,
};

// Re-export adapter traits at crate root.
pub use traits::{ChannelAdapter, PluginAdapter, ProviderAdapter};
