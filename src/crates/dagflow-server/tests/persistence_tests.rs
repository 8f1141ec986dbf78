//! Repository round-trips against an in-memory SQLite database.

use dagflow_server::db::models::{RunStatus, ROLE_ASSISTANT, ROLE_USER};
use dagflow_server::db::repositories::{
    ConversationRepository, MessageRepository, RunRepository, WorkflowRepository,
};
use dagflow_server::{ConversationMemory, DatabaseConnection};

async fn memory_db() -> DatabaseConnection {
    // A single connection: every sqlite::memory: connection is its own
    // private database.
    let db = DatabaseConnection::with_max_connections("sqlite::memory:", 1)
        .await
        .expect("connect");
    db.init_schema().await.expect("schema");
    db
}

#[tokio::test]
async fn workflow_definitions_round_trip() {
    let db = memory_db().await;
    let created = WorkflowRepository::create(db.pool(), "support_bot", "nodes: {}")
        .await
        .unwrap();

    let fetched = WorkflowRepository::get_by_id(db.pool(), &created.id)
        .await
        .unwrap()
        .expect("workflow should exist");
    assert_eq!(fetched.name, "support_bot");
    assert_eq!(fetched.dsl_definition, "nodes: {}");

    assert_eq!(WorkflowRepository::list(db.pool()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn run_records_transition_from_running() {
    let db = memory_db().await;
    let workflow = WorkflowRepository::create(db.pool(), "wf", "nodes: {}")
        .await
        .unwrap();

    let run = RunRepository::create(db.pool(), &workflow.id).await.unwrap();
    assert_eq!(run.status, RunStatus::Running.as_str());
    assert_eq!(run.global_memory, "{}");

    RunRepository::finish(db.pool(), &run.id, RunStatus::Completed, r#"{"a":1}"#)
        .await
        .unwrap();

    let finished = RunRepository::get_by_id(db.pool(), &run.id)
        .await
        .unwrap()
        .expect("run should exist");
    assert_eq!(finished.status, RunStatus::Completed.as_str());
    assert_eq!(finished.global_memory, r#"{"a":1}"#);

    let listed = RunRepository::list_for_workflow(db.pool(), &workflow.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn conversation_rows_are_created_once() {
    let db = memory_db().await;
    ConversationRepository::ensure(db.pool(), "c1", Some("u1"))
        .await
        .unwrap();
    // second attach is a no-op
    ConversationRepository::ensure(db.pool(), "c1", None)
        .await
        .unwrap();

    let conversation = ConversationRepository::get_by_id(db.pool(), "c1")
        .await
        .unwrap()
        .expect("conversation should exist");
    assert_eq!(conversation.user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn history_is_chronological_and_limited() {
    let db = memory_db().await;
    let memory = ConversationMemory::attach(db.pool(), "c1").await.unwrap();

    for i in 0..15 {
        let role = if i % 2 == 0 { ROLE_USER } else { ROLE_ASSISTANT };
        memory
            .add_message(role, &format!("message {i}"))
            .await
            .unwrap();
    }

    let history = memory.history(10).await.unwrap();
    assert_eq!(history.len(), 10);
    // the last ten, oldest first
    assert_eq!(history.first().unwrap().content, "message 5");
    assert_eq!(history.last().unwrap().content, "message 14");

    let text = memory.history_text(2).await.unwrap();
    assert_eq!(text, "assistant: message 13\nuser: message 14");
}

#[tokio::test]
async fn messages_in_other_conversations_are_invisible() {
    let db = memory_db().await;
    let first = ConversationMemory::attach(db.pool(), "c1").await.unwrap();
    let second = ConversationMemory::attach(db.pool(), "c2").await.unwrap();

    first.add_message(ROLE_USER, "only in c1").await.unwrap();

    assert_eq!(first.history(10).await.unwrap().len(), 1);
    assert!(second.history(10).await.unwrap().is_empty());

    let appended = MessageRepository::append(db.pool(), "c2", ROLE_USER, "hello")
        .await
        .unwrap();
    assert_eq!(appended.conversation_id, "c2");
}
