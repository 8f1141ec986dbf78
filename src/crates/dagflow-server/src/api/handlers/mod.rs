//! API handler functions.

pub mod chat;
pub mod dsl;
pub mod health;

pub use chat::{get_history, send_message};
pub use dsl::{get_dsl_content, update_dsl_content};
pub use health::health;
