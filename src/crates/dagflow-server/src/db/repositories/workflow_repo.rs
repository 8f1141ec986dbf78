//! Workflow definition repository.

use chrono::Utc;
use uuid::Uuid;

use crate::db::connection::DatabasePool;
use crate::db::models::Workflow;

/// Database operations on persisted workflow definitions.
pub struct WorkflowRepository;

impl WorkflowRepository {
    /// Persist a workflow definition.
    pub async fn create(
        pool: &DatabasePool,
        name: &str,
        dsl_definition: &str,
    ) -> Result<Workflow, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query_as::<_, Workflow>(
            "INSERT INTO workflows (id, name, dsl_definition, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&id)
        .bind(name)
        .bind(dsl_definition)
        .bind(&now)
        .fetch_one(pool)
        .await
    }

    /// Get a workflow definition by id.
    pub async fn get_by_id(
        pool: &DatabasePool,
        id: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all workflow definitions, newest first.
    pub async fn list(pool: &DatabasePool) -> Result<Vec<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }
}
