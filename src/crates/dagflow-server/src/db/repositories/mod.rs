//! Repositories for database operations, one per entity.

pub mod conversation_repo;
pub mod message_repo;
pub mod run_repo;
pub mod workflow_repo;

pub use conversation_repo::ConversationRepository;
pub use message_repo::MessageRepository;
pub use run_repo::RunRepository;
pub use workflow_repo::WorkflowRepository;
