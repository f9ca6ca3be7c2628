// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./emcee.toml` > `~/.config/emcee/emcee.toml` > `/etc/emcee/emcee.toml`
//! with environment variable overrides via `EMCEE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::EmceeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/emcee/emcee.toml` (system-wide)
/// 3. `~/.config/emcee/emcee.toml` (user XDG config)
/// 4. `./emcee.toml` (local directory)
/// 5. `EMCEE_*` environment variables
pub fn load_config() -> Result<EmceeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmceeConfig::default()))
        .merge(Toml::file("/etc/emcee/emcee.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("emcee/emcee.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("emcee.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<EmceeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmceeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EmceeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmceeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `EMCEE_AGENT_OWNER_ID` must
/// map to `agent.owner_id`, not `agent.owner.id`.
fn env_provider() -> Env {
    Env::prefixed("EMCEE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: EMCEE_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("persona_", "persona.", 1)
            .replacen("router_", "router.", 1)
            .replacen("composer_", "composer.", 1)
            .replacen("filter_", "filter.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
