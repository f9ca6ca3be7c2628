// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured
//! generations and classification verdicts, enabling fast, CI-runnable tests
//! without external API calls. Failure flags and an artificial delay let
//! tests exercise the fail-closed and timeout paths.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use emcee_core::traits::adapter::PluginAdapter;
use emcee_core::traits::provider::ProviderAdapter;
use emcee_core::types::{AdapterType, GenerationRequest, HealthStatus};
use emcee_core::EmceeError;

/// A mock LLM provider with scripted outputs.
///
/// Generations and verdicts are popped from FIFO queues. When a queue is
/// empty, `generate` returns `"mock reply"` and `classify` returns `true`.
/// Clones share queues and counters.
#[derive(Clone)]
pub struct MockProvider {
    generations: Arc<Mutex<VecDeque<String>>>,
    verdicts: Arc<Mutex<VecDeque<bool>>>,
    generate_count: Arc<Mutex<usize>>,
    classify_count: Arc<Mutex<usize>>,
    fail_generate: Arc<Mutex<bool>>,
    fail_classify: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with empty queues.
    pub fn new() -> Self {
        Self {
            generations: Arc::new(Mutex::new(VecDeque::new())),
            verdicts: Arc::new(Mutex::new(VecDeque::new())),
            generate_count: Arc::new(Mutex::new(0)),
            classify_count: Arc::new(Mutex::new(0)),
            fail_generate: Arc::new(Mutex::new(false)),
            fail_classify: Arc::new(Mutex::new(false)),
            delay: Arc::new(Mutex::new(None)),
            last_request: Arc::new(Mutex::new(None)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock provider pre-loaded with generation texts.
    pub fn with_generations(texts: Vec<String>) -> Self {
        Self {
            generations: Arc::new(Mutex::new(VecDeque::from(texts))),
            ..Self::new()
        }
    }

    /// Create a mock provider pre-loaded with classification verdicts.
    pub fn with_verdicts(verdicts: Vec<bool>) -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(VecDeque::from(verdicts))),
            ..Self::new()
        }
    }

    /// Queue a generation text.
    pub async fn push_generation(&self, text: impl Into<String>) {
        self.generations.lock().await.push_back(text.into());
    }

    /// Queue a classification verdict.
    pub async fn push_verdict(&self, verdict: bool) {
        self.verdicts.lock().await.push_back(verdict);
    }

    /// Make every `generate` call fail with a provider error.
    pub async fn fail_generate(&self, fail: bool) {
        *self.fail_generate.lock().await = fail;
    }

    /// Make every `classify` call fail with a provider error.
    pub async fn fail_classify(&self, fail: bool) {
        *self.fail_classify.lock().await = fail;
    }

    /// Stall every call for `delay`, for exercising caller timeouts.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Number of `generate` calls made so far.
    pub async fn generate_calls(&self) -> usize {
        *self.generate_count.lock().await
    }

    /// Number of `classify` calls made so far.
    pub async fn classify_calls(&self) -> usize {
        *self.classify_count.lock().await
    }

    /// The most recent generation request, for prompt assertions.
    pub async fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().await.clone()
    }

    /// The most recent classification prompt.
    pub async fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().await.clone()
    }

    async fn maybe_delay(&self) {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, EmceeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), EmceeError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, EmceeError> {
        *self.generate_count.lock().await += 1;
        *self.last_request.lock().await = Some(request);
        self.maybe_delay().await;

        if *self.fail_generate.lock().await {
            return Err(EmceeError::Provider {
                message: "mock generate failure".into(),
                source: None,
            });
        }

        Ok(self
            .generations
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }

    async fn classify(&self, prompt: &str) -> Result<bool, EmceeError> {
        *self.classify_count.lock().await += 1;
        *self.last_prompt.lock().await = Some(prompt.to_string());
        self.maybe_delay().await;

        if *self.fail_classify.lock().await {
            return Err(EmceeError::Provider {
                message: "mock classify failure".into(),
                source: None,
            });
        }

        Ok(self.verdicts.lock().await.pop_front().unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "be terse".to_string(),
            transcript: vec![],
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn default_outputs_when_queues_empty() {
        let provider = MockProvider::new();
        assert_eq!(provider.generate(request()).await.unwrap(), "mock reply");
        assert!(provider.classify("relevant?").await.unwrap());
    }

    #[tokio::test]
    async fn queued_outputs_come_back_in_order() {
        let provider = MockProvider::new();
        provider.push_generation("first").await;
        provider.push_generation("second").await;
        provider.push_verdict(false).await;
        provider.push_verdict(true).await;

        assert_eq!(provider.generate(request()).await.unwrap(), "first");
        assert_eq!(provider.generate(request()).await.unwrap(), "second");
        assert!(!provider.classify("a").await.unwrap());
        assert!(provider.classify("b").await.unwrap());
    }

    #[tokio::test]
    async fn failure_flags_produce_provider_errors() {
        let provider = MockProvider::new();
        provider.fail_generate(true).await;
        provider.fail_classify(true).await;

        assert!(provider.generate(request()).await.is_err());
        assert!(provider.classify("x").await.is_err());

        provider.fail_generate(false).await;
        assert!(provider.generate(request()).await.is_ok());
    }

    #[tokio::test]
    async fn call_counters_track_usage() {
        let provider = MockProvider::new();
        provider.generate(request()).await.unwrap();
        provider.classify("x").await.unwrap();
        provider.classify("y").await.unwrap();

        assert_eq!(provider.generate_calls().await, 1);
        assert_eq!(provider.classify_calls().await, 2);
    }

    #[tokio::test]
    async fn with_verdicts_preloads_queue() {
        let provider = MockProvider::with_verdicts(vec![false]);
        assert!(!provider.classify("x").await.unwrap());
        // Queue exhausted, falls back to the default.
        assert!(provider.classify("x").await.unwrap());
    }
}
