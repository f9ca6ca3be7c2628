// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as unique community server ids and non-empty paths.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::EmceeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EmceeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.filter.max_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "filter.max_chars must be greater than zero".to_string(),
        });
    }

    if config.composer.history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "composer.history_limit must be greater than zero".to_string(),
        });
    }

    if config.anthropic.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.request_timeout_secs must be greater than zero".to_string(),
        });
    }

    // Community entries need a server id, and ids must be unique.
    let mut seen_servers = HashSet::new();
    for (i, community) in config.communities.iter().enumerate() {
        if community.server_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("communities[{i}].server_id must not be empty"),
            });
            continue;
        }
        if !seen_servers.insert(&community.server_id) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate server_id `{}` in [[communities]] array",
                    community.server_id
                ),
            });
        }

        for (j, entry) in community.faq.iter().enumerate() {
            if entry.patterns.iter().all(|p| p.trim().is_empty()) {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "communities[{i}].faq[{j}] has no non-empty patterns"
                    ),
                });
            }
            if entry.answer.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: format!("communities[{i}].faq[{j}].answer must not be empty"),
                });
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
