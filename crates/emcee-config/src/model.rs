// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the emcee agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level emcee configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values,
/// except that an agent with no `[[communities]]` entries will never speak
/// unprompted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmceeConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// The persona the agent writes in.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Reply-gate settings (question heuristics, quota, cooldown).
    #[serde(default)]
    pub router: RouterConfig,

    /// Generation request assembly settings.
    #[serde(default)]
    pub composer: ComposerConfig,

    /// Reply quality filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Keyword-to-topic mapping for interest tracking.
    #[serde(default)]
    pub topics: TopicsConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-community (chat server) settings.
    #[serde(default)]
    pub communities: Vec<CommunityConfig>,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Platform user id of the agent's owner. The owner always gets a reply.
    /// Empty string disables the owner bypass.
    #[serde(default)]
    pub owner_id: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            owner_id: String::new(),
        }
    }
}

fn default_agent_name() -> String {
    "emcee".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The persona the agent writes in: voice, habits, and hard limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// One-paragraph description of who the agent is.
    #[serde(default)]
    pub description: String,

    /// Overall tone ("casual, dry, helpful").
    #[serde(default)]
    pub tone: String,

    /// Primary language of replies.
    #[serde(default = "default_language")]
    pub language: String,

    /// Verbal tics and filler phrases the persona uses.
    #[serde(default)]
    pub quirks: Vec<String>,

    /// Emoji the persona reaches for.
    #[serde(default)]
    pub favorite_emoji: Vec<String>,

    /// Things the persona would never say.
    #[serde(default)]
    pub never_say: Vec<String>,

    /// Few-shot examples of how the persona replies.
    #[serde(default)]
    pub example_exchanges: Vec<ExampleExchange>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            tone: String::new(),
            language: default_language(),
            quirks: Vec::new(),
            favorite_emoji: Vec::new(),
            never_say: Vec::new(),
            example_exchanges: Vec::new(),
        }
    }
}

fn default_language() -> String {
    "English".to_string()
}

/// A single few-shot example exchange for the persona block.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleExchange {
    /// Situation the exchange happened in.
    #[serde(default)]
    pub context: String,
    /// What the user said.
    pub user_message: String,
    /// How the persona replied.
    pub reply: String,
}

/// Per-community (chat server) configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommunityConfig {
    /// Platform id of the server this entry configures.
    pub server_id: String,

    /// Human-readable community name.
    #[serde(default)]
    pub name: String,

    /// What the community is about, for the system prompt.
    #[serde(default)]
    pub description: String,

    /// Channels the agent may speak in. Empty means all channels.
    #[serde(default)]
    pub active_channels: Vec<String>,

    /// Channels the agent must stay silent in, no matter what.
    #[serde(default)]
    pub ignored_channels: Vec<String>,

    /// Official links. The agent is instructed to use only these.
    #[serde(default)]
    pub links: Vec<NamedLink>,

    /// Predefined question/answer pairs served without generation.
    #[serde(default)]
    pub faq: Vec<FaqEntry>,

    /// Topics that come up often, for the system prompt.
    #[serde(default)]
    pub frequent_topics: Vec<String>,

    /// Free-form extra context for the system prompt.
    #[serde(default)]
    pub extra_context: String,

    /// Overrides `router.daily_limit` for this community when set.
    #[serde(default)]
    pub daily_limit_override: Option<u32>,
}

/// A named official link.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NamedLink {
    pub name: String,
    pub url: String,
}

/// A predefined answer matched by substring patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FaqEntry {
    /// Case-insensitive substring patterns; any match serves the answer.
    pub patterns: Vec<String>,
    /// The canonical answer, sent verbatim.
    pub answer: String,
}

/// Reply-gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Phrases that mark a message as a question or request for help.
    /// Matched case-insensitively as substrings, alongside a literal `?`.
    #[serde(default = "default_question_keywords")]
    pub question_keywords: Vec<String>,

    /// Minimum seconds between agent replies in the same channel.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Maximum agent replies per server per UTC day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Ask the classifier about ambient messages that pass every rule.
    /// When false, ambient messages are always ignored.
    #[serde(default = "default_classify_ambient")]
    pub classify_ambient: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            question_keywords: default_question_keywords(),
            cooldown_secs: default_cooldown_secs(),
            daily_limit: default_daily_limit(),
            classify_ambient: default_classify_ambient(),
        }
    }
}

fn default_question_keywords() -> Vec<String> {
    [
        "does anyone know",
        "can't access",
        "cannot access",
        "where is",
        "where can i",
        "how do i",
        "how can i",
        "help",
        "need",
        "doesn't work",
        "not working",
        "anyone",
        "please",
        "when is",
        "what time",
        "i have a problem",
        "i have a question",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cooldown_secs() -> u64 {
    120
}

fn default_daily_limit() -> u32 {
    15
}

fn default_classify_ambient() -> bool {
    true
}

/// Generation request assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComposerConfig {
    /// How many recent channel messages go into the request.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// How many top-scored past replies are injected as style exemplars.
    #[serde(default = "default_exemplar_limit")]
    pub exemplar_limit: usize,

    /// Minimum score a past reply needs to qualify as an exemplar.
    #[serde(default = "default_min_exemplar_score")]
    pub min_exemplar_score: i64,

    /// Max tokens for generated replies.
    #[serde(default = "default_compose_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            exemplar_limit: default_exemplar_limit(),
            min_exemplar_score: default_min_exemplar_score(),
            max_tokens: default_compose_max_tokens(),
        }
    }
}

fn default_history_limit() -> usize {
    15
}

fn default_exemplar_limit() -> usize {
    3
}

fn default_min_exemplar_score() -> i64 {
    1
}

fn default_compose_max_tokens() -> u32 {
    500
}

/// Reply quality filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Hard character ceiling; longer drafts are always discarded.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// More `!` than this reads as over-enthusiastic assistant text.
    #[serde(default = "default_max_exclamations")]
    pub max_exclamations: usize,

    /// More bulleted lines than this reads as structured assistant text.
    #[serde(default = "default_max_bullet_lines")]
    pub max_bullet_lines: usize,

    /// Stock assistant phrases that disqualify a draft outright.
    #[serde(default = "default_ai_phrases")]
    pub ai_phrases: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_exclamations: default_max_exclamations(),
            max_bullet_lines: default_max_bullet_lines(),
            ai_phrases: default_ai_phrases(),
        }
    }
}

fn default_max_chars() -> usize {
    500
}

fn default_max_exclamations() -> usize {
    3
}

fn default_max_bullet_lines() -> usize {
    2
}

fn default_ai_phrases() -> Vec<String> {
    [
        "great question",
        "excellent question",
        "of course!",
        "certainly!",
        "absolutely!",
        "as an ai",
        "as a language model",
        "as an assistant",
        "i'd be happy to",
        "i would be happy to",
        "i'm glad you asked",
        "hope this helps",
        "i cannot help with that",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Keyword-to-topic mapping for per-user interest tracking.
///
/// Many keywords may map to one topic label; matching is case-insensitive
/// substring containment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TopicsConfig {
    #[serde(default)]
    pub keywords: BTreeMap<String, String>,
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to the `ANTHROPIC_API_KEY`
    /// environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for reply generation.
    #[serde(default = "default_generate_model")]
    pub generate_model: String,

    /// Cheap, fast model used for relevance and naturalness judgments.
    #[serde(default = "default_classify_model")]
    pub classify_model: String,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Deadline for a single generate or classify call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            generate_model: default_generate_model(),
            classify_model: default_classify_model(),
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_generate_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_classify_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("emcee").join("emcee.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("emcee.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

impl EmceeConfig {
    /// Looks up the community entry for a server id.
    pub fn community(&self, server_id: &str) -> Option<&CommunityConfig> {
        self.communities.iter().find(|c| c.server_id == server_id)
    }

    /// The daily reply limit in effect for a server.
    pub fn daily_limit_for(&self, server_id: &str) -> u32 {
        self.community(server_id)
            .and_then(|c| c.daily_limit_override)
            .unwrap_or(self.router.daily_limit)
    }
}
