// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learned response and reaction-vote operations.
//!
//! Votes and score adjustments happen inside one transaction so a response's
//! score always equals the sum of its recorded votes.

use emcee_core::EmceeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::LearnedResponse;

fn row_to_response(row: &rusqlite::Row<'_>) -> Result<LearnedResponse, rusqlite::Error> {
    Ok(LearnedResponse {
        id: row.get(0)?,
        server_id: row.get(1)?,
        trigger_text: row.get(2)?,
        response_text: row.get(3)?,
        score: row.get(4)?,
        message_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const RESPONSE_COLUMNS: &str =
    "id, server_id, trigger_text, response_text, score, message_id, created_at";

/// Insert a new learned response.
pub async fn insert_response(db: &Database, resp: &LearnedResponse) -> Result<(), EmceeError> {
    let resp = resp.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO learned_responses
                 (id, server_id, trigger_text, response_text, score, message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    resp.id,
                    resp.server_id,
                    resp.trigger_text,
                    resp.response_text,
                    resp.score,
                    resp.message_id,
                    resp.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Highest-scored responses for a server, ties broken by most recent.
pub async fn top_scored(
    db: &Database,
    server_id: &str,
    limit: usize,
) -> Result<Vec<LearnedResponse>, EmceeError> {
    let server_id = server_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESPONSE_COLUMNS} FROM learned_responses
                 WHERE server_id = ?1
                 ORDER BY score DESC, created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![server_id, limit as i64], row_to_response)?;
            let mut responses = Vec::new();
            for row in rows {
                responses.push(row?);
            }
            Ok(responses)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a response by the platform id of the sent message.
pub async fn find_by_message_id(
    db: &Database,
    message_id: &str,
) -> Result<Option<LearnedResponse>, EmceeError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {RESPONSE_COLUMNS} FROM learned_responses WHERE message_id = ?1"
                ),
                params![message_id],
                row_to_response,
            );
            match result {
                Ok(resp) => Ok(Some(resp)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record one user's reaction vote and apply its delta to the score.
///
/// Idempotent per (response, user, emoji): a duplicate vote is a no-op.
/// Returns `true` if the vote was new and the score changed.
pub async fn record_vote(
    db: &Database,
    response_id: &str,
    user_id: &str,
    emoji: &str,
    delta: i64,
    now: &str,
) -> Result<bool, EmceeError> {
    let response_id = response_id.to_string();
    let user_id = user_id.to_string();
    let emoji = emoji.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO reaction_votes
                 (response_id, user_id, emoji, delta, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![response_id, user_id, emoji, delta, now],
            )?;
            if inserted > 0 {
                tx.execute(
                    "UPDATE learned_responses SET score = score + ?1 WHERE id = ?2",
                    params![delta, response_id],
                )?;
            }
            tx.commit()?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove a previously recorded vote and reverse its delta.
///
/// Returns `true` if a vote existed and was reversed; removing a reaction
/// that was never recorded is a no-op.
pub async fn remove_vote(
    db: &Database,
    response_id: &str,
    user_id: &str,
    emoji: &str,
) -> Result<bool, EmceeError> {
    let response_id = response_id.to_string();
    let user_id = user_id.to_string();
    let emoji = emoji.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let delta = match tx.query_row(
                "SELECT delta FROM reaction_votes
                 WHERE response_id = ?1 AND user_id = ?2 AND emoji = ?3",
                params![response_id, user_id, emoji],
                |row| row.get::<_, i64>(0),
            ) {
                Ok(delta) => delta,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            };
            tx.execute(
                "DELETE FROM reaction_votes
                 WHERE response_id = ?1 AND user_id = ?2 AND emoji = ?3",
                params![response_id, user_id, emoji],
            )?;
            tx.execute(
                "UPDATE learned_responses SET score = score - ?1 WHERE id = ?2",
                params![delta, response_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_response(id: &str, score: i64, created_at: &str) -> LearnedResponse {
        LearnedResponse {
            id: id.to_string(),
            server_id: "srv-1".to_string(),
            trigger_text: "how do i log in".to_string(),
            response_text: "use the portal link in #start-here".to_string(),
            score,
            message_id: Some(format!("sent-{id}")),
            created_at: created_at.to_string(),
        }
    }

    const NOW: &str = "2026-01-01T12:00:00+00:00";

    #[tokio::test]
    async fn top_scored_orders_by_score_then_recency() {
        let (db, _dir) = setup_db().await;

        insert_response(&db, &make_response("r-low", 1, "2026-01-01T00:00:01+00:00"))
            .await
            .unwrap();
        insert_response(&db, &make_response("r-old", 5, "2026-01-01T00:00:01+00:00"))
            .await
            .unwrap();
        insert_response(&db, &make_response("r-new", 5, "2026-01-02T00:00:01+00:00"))
            .await
            .unwrap();

        let top = top_scored(&db, "srv-1", 10).await.unwrap();
        let ids: Vec<&str> = top.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-new", "r-old", "r-low"]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn top_scored_is_scoped_per_server() {
        let (db, _dir) = setup_db().await;

        insert_response(&db, &make_response("r1", 3, NOW)).await.unwrap();
        let mut other = make_response("r2", 9, NOW);
        other.server_id = "srv-2".to_string();
        other.message_id = Some("sent-other".to_string());
        insert_response(&db, &other).await.unwrap();

        let top = top_scored(&db, "srv-1", 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "r1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_by_message_id_resolves_sent_replies() {
        let (db, _dir) = setup_db().await;

        insert_response(&db, &make_response("r1", 0, NOW)).await.unwrap();

        let found = find_by_message_id(&db, "sent-r1").await.unwrap();
        assert_eq!(found.unwrap().id, "r1");
        assert!(find_by_message_id(&db, "sent-unknown").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_vote_does_not_double_count() {
        let (db, _dir) = setup_db().await;
        insert_response(&db, &make_response("r1", 0, NOW)).await.unwrap();

        assert!(record_vote(&db, "r1", "u1", "👍", 1, NOW).await.unwrap());
        assert!(!record_vote(&db, "r1", "u1", "👍", 1, NOW).await.unwrap());

        let top = top_scored(&db, "srv-1", 1).await.unwrap();
        assert_eq!(top[0].score, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn distinct_users_each_count() {
        let (db, _dir) = setup_db().await;
        insert_response(&db, &make_response("r1", 0, NOW)).await.unwrap();

        for user in ["u1", "u2", "u3"] {
            record_vote(&db, "r1", user, "👍", 1, NOW).await.unwrap();
        }
        record_vote(&db, "r1", "u4", "👎", -1, NOW).await.unwrap();

        let top = top_scored(&db, "srv-1", 1).await.unwrap();
        assert_eq!(top[0].score, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn removing_a_vote_reverses_its_delta() {
        let (db, _dir) = setup_db().await;
        insert_response(&db, &make_response("r1", 0, NOW)).await.unwrap();

        record_vote(&db, "r1", "u1", "👍", 1, NOW).await.unwrap();
        assert!(remove_vote(&db, "r1", "u1", "👍").await.unwrap());

        let top = top_scored(&db, "srv-1", 1).await.unwrap();
        assert_eq!(top[0].score, 0);

        // Removing again is a no-op.
        assert!(!remove_vote(&db, "r1", "u1", "👍").await.unwrap());
        let top = top_scored(&db, "srv-1", 1).await.unwrap();
        assert_eq!(top[0].score, 0);

        db.close().await.unwrap();
    }
}
