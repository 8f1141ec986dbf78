//! Workflow run model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// One execution of a workflow: status plus the final memory snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRun {
    /// Unique run identifier (UUID string).
    pub id: String,

    /// The workflow definition this run executed.
    pub workflow_id: String,

    /// RUNNING while executing, then COMPLETED or FAILED.
    pub status: String,

    /// Final memory snapshot as a JSON string (`{}` until the run ends).
    pub global_memory: String,

    /// Creation timestamp (ISO8601 string).
    pub created_at: String,
}
