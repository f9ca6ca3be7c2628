// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily reply-counter operations.
//!
//! Rows are keyed by (server, UTC date bucket); stale buckets are simply
//! never read again, so no cleanup job is needed.

use emcee_core::EmceeError;
use rusqlite::params;

use crate::database::Database;

/// Replies already sent for a server in the given date bucket.
pub async fn count_for_bucket(
    db: &Database,
    server_id: &str,
    date_bucket: &str,
) -> Result<u32, EmceeError> {
    let server_id = server_id.to_string();
    let date_bucket = date_bucket.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT count_today FROM rate_state
                 WHERE server_id = ?1 AND date_bucket = ?2",
                params![server_id, date_bucket],
                |row| row.get::<_, u32>(0),
            );
            match result {
                Ok(count) => Ok(count),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add one sent reply to a server's bucket.
pub async fn increment_bucket(
    db: &Database,
    server_id: &str,
    date_bucket: &str,
) -> Result<(), EmceeError> {
    let server_id = server_id.to_string();
    let date_bucket = date_bucket.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rate_state (server_id, date_bucket, count_today)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT(server_id, date_bucket) DO UPDATE SET
                     count_today = count_today + 1",
                params![server_id, date_bucket],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
