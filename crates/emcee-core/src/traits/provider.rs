// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM integrations.

use async_trait::async_trait;

use crate::error::EmceeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerationRequest;

/// Adapter for LLM provider integrations.
///
/// The agent makes two kinds of external calls: free-text reply generation
/// and binary classification (relevance of an ambient message, naturalness
/// of a drafted reply). Either call may fail or stall; callers bound them
/// with `tokio::time::timeout` and treat elapsed deadlines as failures.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Generates reply text for the assembled request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, EmceeError>;

    /// Answers a yes/no judgment prompt.
    async fn classify(&self, prompt: &str) -> Result<bool, EmceeError>;
}
