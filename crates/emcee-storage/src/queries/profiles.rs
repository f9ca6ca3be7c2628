// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile and topic-frequency operations.

use emcee_core::EmceeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{TopicCount, UserProfile};

/// Ensure a profile row exists and bump its last-seen timestamp.
pub async fn touch_profile(
    db: &Database,
    user_id: &str,
    server_id: &str,
    now: &str,
) -> Result<(), EmceeError> {
    let user_id = user_id.to_string();
    let server_id = server_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_profiles (user_id, server_id, interaction_count, notes, last_seen_at)
                 VALUES (?1, ?2, 0, '', ?3)
                 ON CONFLICT(user_id, server_id) DO UPDATE SET last_seen_at = excluded.last_seen_at",
                params![user_id, server_id, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Increment a user's agent-interaction counter.
pub async fn bump_interaction(
    db: &Database,
    user_id: &str,
    server_id: &str,
    now: &str,
) -> Result<(), EmceeError> {
    let user_id = user_id.to_string();
    let server_id = server_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_profiles (user_id, server_id, interaction_count, notes, last_seen_at)
                 VALUES (?1, ?2, 1, '', ?3)
                 ON CONFLICT(user_id, server_id) DO UPDATE SET
                     interaction_count = interaction_count + 1,
                     last_seen_at = excluded.last_seen_at",
                params![user_id, server_id, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Increment one topic counter for a user.
pub async fn bump_topic(
    db: &Database,
    user_id: &str,
    server_id: &str,
    topic: &str,
    now: &str,
) -> Result<(), EmceeError> {
    let user_id = user_id.to_string();
    let server_id = server_id.to_string();
    let topic = topic.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_topics (user_id, server_id, topic, frequency, last_seen_at)
                 VALUES (?1, ?2, ?3, 1, ?4)
                 ON CONFLICT(user_id, server_id, topic) DO UPDATE SET
                     frequency = frequency + 1,
                     last_seen_at = excluded.last_seen_at",
                params![user_id, server_id, topic, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user's profile, if one exists.
pub async fn get_profile(
    db: &Database,
    user_id: &str,
    server_id: &str,
) -> Result<Option<UserProfile>, EmceeError> {
    let user_id = user_id.to_string();
    let server_id = server_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT user_id, server_id, interaction_count, notes, last_seen_at
                 FROM user_profiles WHERE user_id = ?1 AND server_id = ?2",
                params![user_id, server_id],
                |row| {
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        server_id: row.get(1)?,
                        interaction_count: row.get(2)?,
                        notes: row.get(3)?,
                        last_seen_at: row.get(4)?,
                    })
                },
            );
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's most frequent topics, highest frequency first.
pub async fn top_topics(
    db: &Database,
    user_id: &str,
    server_id: &str,
    limit: usize,
) -> Result<Vec<TopicCount>, EmceeError> {
    let user_id = user_id.to_string();
    let server_id = server_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT topic, frequency FROM user_topics
                 WHERE user_id = ?1 AND server_id = ?2
                 ORDER BY frequency DESC, topic ASC LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![user_id, server_id, limit as i64], |row| {
                Ok(TopicCount {
                    topic: row.get(0)?,
                    frequency: row.get(1)?,
                })
            })?;
            let mut topics = Vec::new();
            for row in rows {
                topics.push(row?);
            }
            Ok(topics)
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

    const NOW: &str = "2026-01-01T12:00:00+00:00";
    const LATER: &str = "2026-01-01T13:00:00+00:00";

    #[tokio::test]
    async fn touch_creates_then_updates_last_seen() {
        let (db, _dir) = setup_db().await;

        touch_profile(&db, "u1", "s1", NOW).await.unwrap();
        let profile = get_profile(&db, "u1", "s1").await.unwrap().unwrap();
        assert_eq!(profile.interaction_count, 0);
        assert_eq!(profile.last_seen_at, NOW);

        touch_profile(&db, "u1", "s1", LATER).await.unwrap();
        let profile = get_profile(&db, "u1", "s1").await.unwrap().unwrap();
        assert_eq!(profile.interaction_count, 0, "touch must not bump interactions");
        assert_eq!(profile.last_seen_at, LATER);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bump_interaction_counts_up() {
        let (db, _dir) = setup_db().await;

        bump_interaction(&db, "u1", "s1", NOW).await.unwrap();
        bump_interaction(&db, "u1", "s1", LATER).await.unwrap();

        let profile = get_profile(&db, "u1", "s1").await.unwrap().unwrap();
        assert_eq!(profile.interaction_count, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn profiles_are_scoped_per_server() {
        let (db, _dir) = setup_db().await;

        bump_interaction(&db, "u1", "s1", NOW).await.unwrap();
        touch_profile(&db, "u1", "s2", NOW).await.unwrap();

        assert_eq!(
            get_profile(&db, "u1", "s1").await.unwrap().unwrap().interaction_count,
            1
        );
        assert_eq!(
            get_profile(&db, "u1", "s2").await.unwrap().unwrap().interaction_count,
            0
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_profile_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_profile(&db, "nobody", "s1").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn topic_counters_accumulate_and_rank() {
        let (db, _dir) = setup_db().await;

        bump_topic(&db, "u1", "s1", "recordings", NOW).await.unwrap();
        bump_topic(&db, "u1", "s1", "recordings", LATER).await.unwrap();
        bump_topic(&db, "u1", "s1", "platform-access", NOW).await.unwrap();

        let topics = top_topics(&db, "u1", "s1", 5).await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic, "recordings");
        assert_eq!(topics[0].frequency, 2);
        assert_eq!(topics[1].frequency, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn top_topics_respects_limit() {
        let (db, _dir) = setup_db().await;

        for topic in ["a", "b", "c", "d"] {
            bump_topic(&db, "u1", "s1", topic, NOW).await.unwrap();
        }
        let topics = top_topics(&db, "u1", "s1", 2).await.unwrap();
        assert_eq!(topics.len(), 2);

        db.close().await.unwrap();
    }
}
