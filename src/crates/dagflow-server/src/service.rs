//! Workflow service: the outer driver around the engine.
//!
//! Owns the currently loaded graph (optional, hot-swappable), the optional
//! database connection, and the DSL file path. Each execution constructs a
//! fresh [`GlobalMemory`] — node outputs never leak between runs or chat
//! turns — and brackets the run with a RUNNING → COMPLETED/FAILED record
//! when persistence is enabled.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use dagflow_core::{parse_workflow, GlobalMemory, WorkflowEngine, WorkflowGraph};

use crate::conversation::{ConversationMemory, DEFAULT_HISTORY_LIMIT};
use crate::db::models::{RunStatus, ROLE_ASSISTANT, ROLE_USER};
use crate::db::repositories::{RunRepository, WorkflowRepository};
use crate::db::DatabaseConnection;
use crate::error::{Result, ServerError};

/// Memory key whose `printed` field is the user-facing chat reply.
const TERMINAL_NODE: &str = "end_node";

/// Driver around a loaded workflow.
pub struct WorkflowService {
    graph: RwLock<Option<Arc<WorkflowGraph>>>,
    db: Option<DatabaseConnection>,
    dsl_path: PathBuf,
    workflow_record_id: RwLock<Option<String>>,
}

impl WorkflowService {
    fn empty(dsl_path: &Path, db: Option<DatabaseConnection>) -> Self {
        Self {
            graph: RwLock::new(None),
            db,
            dsl_path: dsl_path.to_path_buf(),
            workflow_record_id: RwLock::new(None),
        }
    }

    /// Load and compile the DSL document from `dsl_path`, persisting the
    /// definition when a database connection is supplied. Fails the caller
    /// on an unreadable or invalid document.
    pub async fn load(dsl_path: &Path, db: Option<DatabaseConnection>) -> Result<Self> {
        let service = Self::empty(dsl_path, db);
        service.load_from_disk().await?;
        Ok(service)
    }

    /// Like [`load`](Self::load), but a failed initial load is logged and
    /// the service starts without a workflow. A later
    /// [`reload`](Self::reload) can bring it up.
    pub async fn load_or_degraded(dsl_path: &Path, db: Option<DatabaseConnection>) -> Self {
        let service = Self::empty(dsl_path, db);
        if let Err(e) = service.load_from_disk().await {
            tracing::warn!(
                path = %dsl_path.display(),
                error = %e,
                "workflow load failed, serving without a loaded workflow"
            );
        }
        service
    }

    async fn load_from_disk(&self) -> Result<()> {
        let content = tokio::fs::read_to_string(&self.dsl_path).await?;
        let graph = parse_workflow(&content)?;
        tracing::info!(
            workflow = %graph.workflow_id,
            version = %graph.version,
            nodes = graph.len(),
            path = %self.dsl_path.display(),
            "workflow loaded"
        );

        if let Some(db) = &self.db {
            let record =
                WorkflowRepository::create(db.pool(), &graph.workflow_id, &content).await?;
            tracing::info!(record_id = %record.id, "persisted workflow definition");
            *self.workflow_record_id.write().await = Some(record.id);
        }

        *self.graph.write().await = Some(Arc::new(graph));
        Ok(())
    }

    /// The currently loaded graph, if any.
    pub async fn graph(&self) -> Option<Arc<WorkflowGraph>> {
        self.graph.read().await.clone()
    }

    /// Whether a compiled workflow is currently loaded.
    pub async fn workflow_loaded(&self) -> bool {
        self.graph.read().await.is_some()
    }

    /// The raw DSL document as stored on disk.
    pub async fn dsl_content(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.dsl_path).await?)
    }

    /// Validate a new DSL document, then swap it in and rewrite the file.
    /// An invalid document leaves the current graph untouched.
    pub async fn reload(&self, content: &str) -> Result<()> {
        let graph = parse_workflow(content)?;
        tokio::fs::write(&self.dsl_path, content).await?;
        tracing::info!(workflow = %graph.workflow_id, "workflow reloaded");
        *self.graph.write().await = Some(Arc::new(graph));
        Ok(())
    }

    /// Execute the workflow once against a fresh memory seeded with
    /// `initial_inputs`, returning the final memory snapshot.
    pub async fn execute(&self, initial_inputs: Value) -> Result<Map<String, Value>> {
        let graph = self.graph().await.ok_or(ServerError::WorkflowNotLoaded)?;
        let memory = Arc::new(GlobalMemory::with_inputs(initial_inputs));

        let workflow_record_id = self.workflow_record_id.read().await.clone();
        let run_id = match (&self.db, &workflow_record_id) {
            (Some(db), Some(workflow_record_id)) => {
                let run = RunRepository::create(db.pool(), workflow_record_id).await?;
                tracing::info!(run_id = %run.id, "created workflow run");
                Some(run.id)
            }
            _ => None,
        };

        let outcome = WorkflowEngine::new(graph, Arc::clone(&memory)).run().await;

        if let (Some(db), Some(run_id)) = (&self.db, &run_id) {
            let status = if outcome.is_ok() {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            };
            let final_memory = serde_json::to_string(&Value::Object(memory.snapshot()))?;
            RunRepository::finish(db.pool(), run_id, status, &final_memory).await?;
            tracing::info!(run_id = %run_id, status = status.as_str(), "updated run record");
        }

        outcome?;
        Ok(memory.snapshot())
    }

    /// Run one chat turn: record the user message, execute the workflow
    /// with the query and recent history as inputs, record and return the
    /// reply.
    pub async fn chat_turn(
        &self,
        query: &str,
        conversation_id: Option<String>,
    ) -> Result<(String, String)> {
        // Checked up front so a degraded service records nothing.
        if !self.workflow_loaded().await {
            return Err(ServerError::WorkflowNotLoaded);
        }

        let conversation_id = conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let conversation = match &self.db {
            Some(db) => Some(ConversationMemory::attach(db.pool(), &conversation_id).await?),
            None => None,
        };

        if let Some(conversation) = &conversation {
            conversation.add_message(ROLE_USER, query).await?;
        }
        let history = match &conversation {
            Some(conversation) => conversation.history_text(DEFAULT_HISTORY_LIMIT).await?,
            None => String::new(),
        };

        let snapshot = self
            .execute(json!({
                "query": query,
                "conversation_id": conversation_id,
                "memory": history,
            }))
            .await?;
        let response = terminal_reply(&snapshot);

        if let Some(conversation) = &conversation {
            conversation.add_message(ROLE_ASSISTANT, &response).await?;
        }

        Ok((conversation_id, response))
    }

    /// Fetch the stored history of a conversation (empty without a
    /// database).
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<crate::db::models::Message>> {
        match &self.db {
            Some(db) => {
                let conversation =
                    ConversationMemory::attach(db.pool(), conversation_id).await?;
                Ok(conversation.history(DEFAULT_HISTORY_LIMIT).await?)
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Extract the user-facing reply from a final memory snapshot: the
/// terminal node's `printed` field, or a placeholder when absent.
pub fn terminal_reply(snapshot: &Map<String, Value>) -> String {
    snapshot
        .get(TERMINAL_NODE)
        .and_then(|output| output.get("printed"))
        .and_then(Value::as_str)
        .unwrap_or("...")
        .to_string()
}
