// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the emcee agent.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed query modules, and the two
//! learning stores built on top of them: [`ProfileStore`] (per-user history
//! and topic interests) and [`ResponseArchive`] (sent replies scored by
//! reaction feedback).

pub mod archive;
pub mod database;
pub mod migrations;
pub mod models;
pub mod profile_store;
pub mod queries;
pub mod topics;

pub use archive::ResponseArchive;
pub use database::Database;
pub use models::*;
pub use profile_store::ProfileStore;
pub use topics::TopicMatcher;
