//! Server-side error type.
//!
//! Wraps the core workflow errors plus the failure modes the drivers add:
//! database access, filesystem access to the DSL document, and JSON
//! serialization of run records.

use dagflow_core::WorkflowError;
use thiserror::Error;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors surfaced by the persistence layer, service, and HTTP drivers.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// No compiled workflow is loaded; the service is degraded until a
    /// valid document is supplied via reload.
    #[error("no workflow loaded")]
    WorkflowNotLoaded,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
