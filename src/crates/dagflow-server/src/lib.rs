//! # dagflow-server — drivers around the dagflow engine
//!
//! Everything outside the core execution subsystem: SQLite persistence of
//! workflow definitions, run records, and conversation history; the
//! [`WorkflowService`](service::WorkflowService) driver that brackets runs
//! with status records and feeds chat history into workflow inputs; the
//! axum HTTP surface; and the `dagflow` / `dagflow-server` binaries.

pub mod api;
pub mod conversation;
pub mod db;
pub mod error;
pub mod service;

pub use conversation::{ConversationMemory, DEFAULT_HISTORY_LIMIT};
pub use db::{DatabaseConnection, DatabasePool};
pub use error::{Result, ServerError};
pub use service::{terminal_reply, WorkflowService};
