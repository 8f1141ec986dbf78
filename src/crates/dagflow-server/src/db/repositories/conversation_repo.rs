//! Conversation repository.

use chrono::Utc;

use crate::db::connection::DatabasePool;
use crate::db::models::Conversation;

/// Database operations on conversations.
pub struct ConversationRepository;

impl ConversationRepository {
    /// Create the conversation row if it does not exist yet.
    pub async fn ensure(
        pool: &DatabasePool,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO conversations (id, user_id, created_at)
             VALUES (?, ?, ?)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .bind(&now)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Get a conversation by id.
    pub async fn get_by_id(
        pool: &DatabasePool,
        id: &str,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
