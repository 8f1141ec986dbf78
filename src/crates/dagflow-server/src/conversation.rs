//! Conversation memory.
//!
//! Persists chat turns and renders the recent history as the flat
//! `role: content` text the workflow receives under `inputs.memory`.

use crate::db::models::Message;
use crate::db::repositories::{ConversationRepository, MessageRepository};
use crate::db::DatabasePool;

/// How many trailing messages a workflow sees by default.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Handle on one conversation's stored history.
pub struct ConversationMemory {
    conversation_id: String,
    pool: DatabasePool,
}

impl ConversationMemory {
    /// Attach to a conversation, creating its row on first use.
    pub async fn attach(pool: &DatabasePool, conversation_id: &str) -> Result<Self, sqlx::Error> {
        ConversationRepository::ensure(pool, conversation_id, None).await?;
        Ok(Self {
            conversation_id: conversation_id.to_string(),
            pool: pool.clone(),
        })
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Append one message.
    pub async fn add_message(&self, role: &str, content: &str) -> Result<(), sqlx::Error> {
        MessageRepository::append(&self.pool, &self.conversation_id, role, content).await?;
        Ok(())
    }

    /// The last `limit` messages in chronological order.
    pub async fn history(&self, limit: u32) -> Result<Vec<Message>, sqlx::Error> {
        MessageRepository::recent(&self.pool, &self.conversation_id, limit).await
    }

    /// History flattened to `role: content` lines for template contexts.
    pub async fn history_text(&self, limit: u32) -> Result<String, sqlx::Error> {
        let messages = self.history(limit).await?;
        Ok(messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
