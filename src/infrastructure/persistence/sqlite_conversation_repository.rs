use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::application::ports::{ConversationRepository, MessagePage, RepositoryError};
use crate::domain::{Conversation, ConversationId, Message, MessageId};

/// Conversation log over SQLite.
///
/// Identifiers are stored as their UUIDv7 text form, so `ORDER BY id` and
/// the `id <= cursor` boundary both follow creation order. The
/// `conversation_seq` counter row backs auto-numbered titles; it is seeded
/// from the existing conversation count the first time the schema is
/// created and only ever incremented afterwards, so numbers survive
/// restarts and deletions never free them.
pub struct SqliteConversationRepository {
    pool: SqlitePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                last_message_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                role            TEXT NOT NULL,
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id, id)",
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counters (
                name  TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO counters (name, value)
            VALUES ('conversation_seq', (SELECT COUNT(*) FROM conversations))
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for SqliteConversationRepository {
    #[instrument(skip(self))]
    async fn create_conversation(&self) -> Result<Conversation, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(connection_failed)?;

        // Single atomic increment-and-read; safe across instances sharing
        // one database file.
        let row = sqlx::query(
            "UPDATE counters SET value = value + 1 WHERE name = 'conversation_seq' RETURNING value",
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(query_failed)?;
        let seq: i64 = row.try_get("value").map_err(query_failed)?;

        let conversation = Conversation::new(format!("Conversation #{}", seq));
        sqlx::query(
            r#"
            INSERT INTO conversations (id, title, created_at, last_message_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(conversation.last_message_at)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        tx.commit().await.map_err(query_failed)?;
        Ok(conversation)
    }

    #[instrument(skip(self))]
    async fn list_conversations(&self) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, created_at, last_message_at
            FROM conversations
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter().map(conversation_from_row).collect()
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Conversation, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, created_at, last_message_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(row) => conversation_from_row(&row),
            None => Err(not_found(id)),
        }
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn delete_conversation(&self, id: ConversationId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(connection_failed)?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tx.commit().await.map_err(query_failed)?;
        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, conversation_id = %message.conversation_id))]
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn touch_last_message_at(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET last_message_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    async fn get_history(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter().map(message_from_row).collect()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id, limit = limit))]
    async fn get_page(
        &self,
        conversation_id: ConversationId,
        cursor: Option<MessageId>,
        limit: usize,
    ) -> Result<MessagePage, RepositoryError> {
        // The conversation must exist even when it has no messages.
        self.get_conversation(conversation_id).await?;

        // Fetch one extra row to learn whether older messages remain. The
        // boundary clamps `limit`, but this must hold for any caller.
        let fetch_limit = i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX);
        let rows = match cursor {
            Some(cursor) => {
                sqlx::query(
                    r#"
                    SELECT id, conversation_id, role, content, created_at
                    FROM messages
                    WHERE conversation_id = $1 AND id <= $2
                    ORDER BY created_at DESC, id DESC
                    LIMIT $3
                    "#,
                )
                .bind(conversation_id.to_string())
                .bind(cursor.to_string())
                .bind(fetch_limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, conversation_id, role, content, created_at
                    FROM messages
                    WHERE conversation_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(conversation_id.to_string())
                .bind(fetch_limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(query_failed)?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        // Newest-first at this point; the row past `limit` is the oldest
        // excluded message and becomes the cursor for the next older page.
        let next_cursor = if messages.len() > limit {
            let beyond = messages.split_off(limit);
            beyond.first().map(|m| m.id)
        } else {
            None
        };

        messages.reverse();

        // Walk forward in time from the newest entry of this page; the last
        // of up to `limit` newer messages is the cursor of the adjacent
        // newer page. Null when the page already touches the head.
        let prev_cursor = match (cursor, messages.last()) {
            (Some(_), Some(newest)) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id
                    FROM messages
                    WHERE conversation_id = $1 AND id > $2
                    ORDER BY created_at ASC, id ASC
                    LIMIT $3
                    "#,
                )
                .bind(conversation_id.to_string())
                .bind(newest.id.to_string())
                .bind(i64::try_from(limit).unwrap_or(i64::MAX))
                .fetch_all(&self.pool)
                .await
                .map_err(query_failed)?;

                match rows.last() {
                    Some(row) => Some(message_id_from_row(row)?),
                    None => None,
                }
            }
            _ => None,
        };

        Ok(MessagePage {
            messages,
            next_cursor,
            prev_cursor,
        })
    }
}

fn conversation_from_row(row: &SqliteRow) -> Result<Conversation, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_failed)?;
    Ok(Conversation {
        id: id.parse().map_err(decode_failed)?,
        title: row.try_get("title").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
        last_message_at: row.try_get("last_message_at").map_err(query_failed)?,
    })
}

fn message_from_row(row: &SqliteRow) -> Result<Message, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_failed)?;
    let conversation_id: String = row.try_get("conversation_id").map_err(query_failed)?;
    let role: String = row.try_get("role").map_err(query_failed)?;
    Ok(Message {
        id: id.parse().map_err(decode_failed)?,
        conversation_id: conversation_id.parse().map_err(decode_failed)?,
        role: role.parse().map_err(RepositoryError::QueryFailed)?,
        content: row.try_get("content").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
    })
}

fn message_id_from_row(row: &SqliteRow) -> Result<MessageId, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_failed)?;
    id.parse().map_err(decode_failed)
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn connection_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::ConnectionFailed(e.to_string())
}

fn decode_failed(e: uuid::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn not_found(id: ConversationId) -> RepositoryError {
    RepositoryError::NotFound(format!("conversation {}", id))
}
