//! dagflow HTTP server binary.
//!
//! Serves the chat and DSL management endpoints over the workflow loaded
//! at startup. Both collaborators degrade instead of aborting: a failed
//! database init runs without persistence, and a failed workflow load
//! serves with `workflow_loaded: false` until a valid document is posted
//! to `/dsl/content`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use dagflow_server::api::create_router;
use dagflow_server::{DatabaseConnection, WorkflowService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let dsl_path: PathBuf = std::env::var("DAGFLOW_DSL_PATH")
        .unwrap_or_else(|_| "workflows/support_bot.yaml".to_string())
        .into();
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:dagflow.db?mode=rwc".to_string());

    let db = match init_database(&database_url).await {
        Ok(db) => Some(db),
        Err(e) => {
            tracing::warn!(error = %e, "database initialization failed, running without persistence");
            None
        }
    };

    let service = Arc::new(WorkflowService::load_or_degraded(&dsl_path, db).await);
    let router = create_router(service);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()?;
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!(%addr, "dagflow server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn init_database(database_url: &str) -> Result<DatabaseConnection, sqlx::Error> {
    let db = DatabaseConnection::new(database_url).await?;
    db.init_schema().await?;
    tracing::info!(database_url, "database initialized");
    Ok(db)
}
