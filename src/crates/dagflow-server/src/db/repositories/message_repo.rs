//! Chat message repository.

use chrono::Utc;
use uuid::Uuid;

use crate::db::connection::DatabasePool;
use crate::db::models::Message;

/// Database operations on conversation messages.
pub struct MessageRepository;

impl MessageRepository {
    /// Append a message to a conversation.
    pub async fn append(
        pool: &DatabasePool,
        conversation_id: &str,
        role: &str,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, conversation_id, role, content, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(&now)
        .fetch_one(pool)
        .await
    }

    /// The last `limit` messages of a conversation, in chronological order.
    /// Insertion order is tracked by rowid so same-second messages keep
    /// their relative order.
    pub async fn recent(
        pool: &DatabasePool,
        conversation_id: &str,
        limit: u32,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, role, content, created_at FROM (
                 SELECT rowid AS seq, * FROM messages
                 WHERE conversation_id = ?
                 ORDER BY seq DESC LIMIT ?
             ) ORDER BY seq ASC",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
