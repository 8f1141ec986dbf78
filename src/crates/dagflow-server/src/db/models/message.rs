//! Chat message model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Message role of the human participant.
pub const ROLE_USER: &str = "user";

/// Message role of the workflow's reply.
pub const ROLE_ASSISTANT: &str = "assistant";

/// A single message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier (UUID string).
    pub id: String,

    /// The conversation this message belongs to.
    pub conversation_id: String,

    /// `user` or `assistant`.
    pub role: String,

    /// Message text.
    pub content: String,

    /// Creation timestamp (ISO8601 string).
    pub created_at: String,
}
