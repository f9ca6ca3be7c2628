// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use emcee_core::EmceeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::StoredMessage;

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<StoredMessage, rusqlite::Error> {
    Ok(StoredMessage {
        id: row.get(0)?,
        server_id: row.get(1)?,
        channel_id: row.get(2)?,
        author_id: row.get(3)?,
        content: row.get(4)?,
        is_from_agent: row.get::<_, i64>(5)? != 0,
        reply_to_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert a message. Re-delivered platform events are ignored by id.
pub async fn insert_message(db: &Database, msg: &StoredMessage) -> Result<(), EmceeError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO messages
                 (id, server_id, channel_id, author_id, content, is_from_agent, reply_to_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    msg.id,
                    msg.server_id,
                    msg.channel_id,
                    msg.author_id,
                    msg.content,
                    msg.is_from_agent as i64,
                    msg.reply_to_id,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the most recent messages for a channel, oldest first.
pub async fn recent_for_channel(
    db: &Database,
    channel_id: &str,
    limit: usize,
) -> Result<Vec<StoredMessage>, EmceeError> {
    let channel_id = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, server_id, channel_id, author_id, content, is_from_agent, reply_to_id, created_at
                 FROM messages WHERE channel_id = ?1
                 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![channel_id, limit as i64], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count messages a user has sent in a server.
pub async fn count_for_author(
    db: &Database,
    author_id: &str,
    server_id: &str,
) -> Result<i64, EmceeError> {
    let author_id = author_id.to_string();
    let server_id = server_id.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE author_id = ?1 AND server_id = ?2",
                params![author_id, server_id],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(count)
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

    fn make_msg(id: &str, channel: &str, content: &str, timestamp: &str) -> StoredMessage {
        StoredMessage {
            id: id.to_string(),
            server_id: "srv-1".to_string(),
            channel_id: channel.to_string(),
            author_id: "user-1".to_string(),
            content: content.to_string(),
            is_from_agent: false,
            reply_to_id: None,
            created_at: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_read_back_in_order() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("m1", "chan", "first", "2026-01-01T00:00:01+00:00"))
            .await
            .unwrap();
        insert_message(&db, &make_msg("m2", "chan", "second", "2026-01-01T00:00:02+00:00"))
            .await
            .unwrap();
        insert_message(&db, &make_msg("m3", "chan", "third", "2026-01-01T00:00:03+00:00"))
            .await
            .unwrap();

        let messages = recent_for_channel(&db, "chan", 10).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[2].content, "third");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_respects_limit_and_keeps_newest() {
        let (db, _dir) = setup_db().await;

        for i in 0..5 {
            let msg = make_msg(
                &format!("m{i}"),
                "chan",
                &format!("msg {i}"),
                &format!("2026-01-01T00:00:0{i}+00:00"),
            );
            insert_message(&db, &msg).await.unwrap();
        }

        let messages = recent_for_channel(&db, "chan", 2).await.unwrap();
        assert_eq!(messages.len(), 2);
        // The two newest, oldest of the pair first.
        assert_eq!(messages[0].content, "msg 3");
        assert_eq!(messages[1].content, "msg 4");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_platform_id_is_ignored() {
        let (db, _dir) = setup_db().await;

        let msg = make_msg("m1", "chan", "original", "2026-01-01T00:00:01+00:00");
        insert_message(&db, &msg).await.unwrap();
        let dup = make_msg("m1", "chan", "redelivered", "2026-01-01T00:00:02+00:00");
        insert_message(&db, &dup).await.unwrap();

        let messages = recent_for_channel(&db, "chan", 10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "original");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_for_author_scopes_by_server() {
        let (db, _dir) = setup_db().await;

        insert_message(&db, &make_msg("m1", "chan", "a", "2026-01-01T00:00:01+00:00"))
            .await
            .unwrap();
        let mut other = make_msg("m2", "chan", "b", "2026-01-01T00:00:02+00:00");
        other.server_id = "srv-2".to_string();
        insert_message(&db, &other).await.unwrap();

        assert_eq!(count_for_author(&db, "user-1", "srv-1").await.unwrap(), 1);
        assert_eq!(count_for_author(&db, "user-1", "srv-2").await.unwrap(), 1);
        assert_eq!(count_for_author(&db, "user-x", "srv-1").await.unwrap(), 0);

        db.close().await.unwrap();
    }
}
