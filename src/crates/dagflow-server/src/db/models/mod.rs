//! Database models.

pub mod conversation;
pub mod message;
pub mod run;
pub mod workflow;

pub use conversation::Conversation;
pub use message::{Message, ROLE_ASSISTANT, ROLE_USER};
pub use run::{RunStatus, WorkflowRun};
pub use workflow::Workflow;
