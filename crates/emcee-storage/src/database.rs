// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use emcee_core::EmceeError;
use tracing::debug;

use crate::migrations;

/// Handle to the agent's SQLite database.
///
/// Cloning is cheap: clones share the same background connection thread,
/// which is what keeps the single-writer model intact.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// Migrations run first on a short-lived synchronous connection; the
    /// async handle is only created once the schema is current, so every
    /// query issued through [`Database::connection`] sees the final schema.
    pub async fn open(path: &str) -> Result<Self, EmceeError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| EmceeError::Storage {
                source: Box::new(e),
            })?;
        }

        let mut sync_conn = rusqlite::Connection::open(path).map_err(|e| EmceeError::Storage {
            source: Box::new(e),
        })?;
        sync_conn
            .execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(|e| EmceeError::Storage {
                source: Box::new(e),
            })?;
        migrations::run_migrations(&mut sync_conn)?;
        sync_conn.close().map_err(|(_, e)| EmceeError::Storage {
            source: Box::new(e),
        })?;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| EmceeError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the shared async connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and releases the connection.
    pub async fn close(&self) -> Result<(), EmceeError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> EmceeError {
    EmceeError::Storage {
        source: Box::new(e),
    }
}
