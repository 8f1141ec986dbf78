//! HTTP surface.
//!
//! A small axum API mirroring the chat and DSL management endpoints of the
//! runtime: send a chat turn, read conversation history, read or hot-swap
//! the workflow document, and a health probe.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{create_router, AppState};
