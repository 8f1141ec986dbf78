//! Workflow run repository.

use chrono::Utc;
use uuid::Uuid;

use crate::db::connection::DatabasePool;
use crate::db::models::{RunStatus, WorkflowRun};

/// Database operations on workflow run records.
pub struct RunRepository;

impl RunRepository {
    /// Insert a RUNNING row for a starting run.
    pub async fn create(
        pool: &DatabasePool,
        workflow_id: &str,
    ) -> Result<WorkflowRun, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query_as::<_, WorkflowRun>(
            "INSERT INTO workflow_runs (id, workflow_id, status, global_memory, created_at)
             VALUES (?, ?, ?, '{}', ?)
             RETURNING *",
        )
        .bind(&id)
        .bind(workflow_id)
        .bind(RunStatus::Running.as_str())
        .bind(&now)
        .fetch_one(pool)
        .await
    }

    /// Record the terminal status and final memory of a run.
    pub async fn finish(
        pool: &DatabasePool,
        id: &str,
        status: RunStatus,
        global_memory: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE workflow_runs SET status = ?, global_memory = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(global_memory)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Get a run record by id.
    pub async fn get_by_id(
        pool: &DatabasePool,
        id: &str,
    ) -> Result<Option<WorkflowRun>, sqlx::Error> {
        sqlx::query_as::<_, WorkflowRun>("SELECT * FROM workflow_runs WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List runs for a workflow, newest first.
    pub async fn list_for_workflow(
        pool: &DatabasePool,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowRun>, sqlx::Error> {
        sqlx::query_as::<_, WorkflowRun>(
            "SELECT * FROM workflow_runs WHERE workflow_id = ? ORDER BY created_at DESC",
        )
        .bind(workflow_id)
        .fetch_all(pool)
        .await
    }
}
