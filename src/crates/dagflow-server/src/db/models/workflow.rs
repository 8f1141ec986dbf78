//! Workflow definition model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted workflow definition.
///
/// Timestamps are ISO8601 strings due to SQLite type limitations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    /// Unique workflow identifier (UUID string).
    pub id: String,

    /// Workflow name, taken from the document's `id` field.
    pub name: String,

    /// The raw DSL document.
    pub dsl_definition: String,

    /// Creation timestamp (ISO8601 string).
    pub created_at: String,
}
