//! Persistence layer.
//!
//! SQLite-backed storage for workflow definitions, run records, and
//! conversation history. The engine itself never touches this layer; the
//! outer drivers write a RUNNING row before a run and update status plus
//! final memory afterwards. The whole layer is optional — the CLI's
//! `--no-db` flag runs workflows without it.

pub mod connection;
pub mod models;
pub mod repositories;

pub use connection::{DatabaseConnection, DatabasePool};
