//! dagflow CLI.
//!
//! Loads a workflow document, optionally persists definitions and run
//! records to SQLite, and either executes the workflow once with demo
//! inputs or drives it turn by turn in an interactive chat loop.

use clap::Parser;
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use dagflow_server::{DatabaseConnection, WorkflowService};

#[derive(Parser, Debug)]
#[command(name = "dagflow", about = "DSL-driven workflow runtime")]
struct Args {
    /// Path to the workflow YAML document.
    #[arg(long, default_value = "workflows/demo.yaml")]
    file: PathBuf,

    /// Skip database persistence.
    #[arg(long)]
    no_db: bool,

    /// Run an interactive chat loop instead of a single execution.
    #[arg(long)]
    chat: bool,

    /// SQLite connection string.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:dagflow.db?mode=rwc")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let args = Args::parse();

    let db = if args.no_db {
        None
    } else {
        match connect(&args.database_url).await {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!(error = %e, "database initialization failed, running without persistence");
                None
            }
        }
    };

    let service = WorkflowService::load(&args.file, db).await?;
    let graph = service
        .graph()
        .await
        .ok_or_else(|| anyhow::anyhow!("workflow not loaded"))?;
    tracing::info!(workflow = %graph.workflow_id, version = %graph.version, "ready");

    if args.chat {
        chat_loop(&service).await?;
    } else {
        run_single_execution(&service, &graph.workflow_id).await?;
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<DatabaseConnection, sqlx::Error> {
    let db = DatabaseConnection::new(database_url).await?;
    db.init_schema().await?;
    tracing::info!(database_url, "database initialized");
    Ok(db)
}

/// Demo input bundles, keyed by workflow id.
fn demo_inputs(workflow_id: &str) -> Value {
    if workflow_id == "intelligent_qa_demo" {
        json!({
            "question": "What is the difference between supervised and unsupervised machine learning?"
        })
    } else {
        json!({"query": "Hello dagflow", "a": 10, "b": 20})
    }
}

async fn run_single_execution(service: &WorkflowService, workflow_id: &str) -> anyhow::Result<()> {
    let started = Instant::now();
    let snapshot = service.execute(demo_inputs(workflow_id)).await?;
    tracing::info!(elapsed = ?started.elapsed(), "execution finished");

    println!("Final Memory State:");
    println!("{}", serde_json::to_string_pretty(&Value::Object(snapshot))?);
    Ok(())
}

async fn chat_loop(service: &WorkflowService) -> anyhow::Result<()> {
    let mut conversation_id: Option<String> = None;
    println!("Type 'exit' to quit.");

    loop {
        print!("\nUser: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        match service.chat_turn(query, conversation_id.clone()).await {
            Ok((id, response)) => {
                conversation_id = Some(id);
                println!("Bot: {response}");
            }
            Err(e) => {
                tracing::error!(error = %e, "chat turn failed");
            }
        }
    }

    Ok(())
}
