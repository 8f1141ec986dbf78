//! Conversation model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chat conversation grouping a sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Unique conversation identifier (UUID string).
    pub id: String,

    /// Optional owning user.
    pub user_id: Option<String>,

    /// Creation timestamp (ISO8601 string).
    pub created_at: String,
}
