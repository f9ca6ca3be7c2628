// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for emcee integration tests.
//!
//! Mock implementations of the channel and provider seams, good enough to
//! drive the whole pipeline end to end without a chat platform or an API key.

pub mod mock_channel;
pub mod mock_provider;

pub use mock_channel::MockChannel;
pub use mock_provider::MockProvider;
