//! End-to-end pipeline tests.
//!
//! Drive the orchestrator through real SQLite databases with the mock model.

use sqlquill::app::{Orchestrator, SessionStatus};
use sqlquill::commands::{Command, CommandOutput};
use sqlquill::db::{connect, StatementResult};
use sqlquill::llm::{MockLlmClient, NO_SQL_SENTINEL};
use tempfile::TempDir;

/// Creates a seeded SQLite database and returns its descriptor.
async fn seeded_database(dir: &TempDir) -> String {
    let path = dir.path().join("shop.db");
    let url = format!("sqlite:///{}", path.display());

    let client = connect(&url).await.unwrap();
    for statement in [
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL, name TEXT)",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL REFERENCES users(id), total REAL DEFAULT 0)",
        "INSERT INTO users (email, name) VALUES ('ada@example.com', 'Ada'), ('bob@example.com', NULL)",
        "INSERT INTO orders (user_id, total) VALUES (1, 9.5), (1, 20.0), (2, 3.25)",
    ] {
        client.execute(statement).await.unwrap();
    }
    client.close().await.unwrap();

    url
}

fn table_of(outputs: &[CommandOutput]) -> Option<(&Vec<String>, &Vec<Vec<String>>)> {
    outputs.iter().find_map(|output| match output {
        CommandOutput::Table { headers, rows } => Some((headers, rows)),
        _ => None,
    })
}

#[tokio::test]
async fn test_connect_introspects_schema() {
    let dir = tempfile::tempdir().unwrap();
    let url = seeded_database(&dir).await;
    let mut orchestrator = Orchestrator::with_drivers(Box::new(MockLlmClient::new()));

    let outputs = orchestrator.dispatch(Command::Connect(url)).await;

    assert_eq!(outputs[0], CommandOutput::status(true, "Connected successfully"));
    let state = orchestrator.state();
    assert_eq!(state.db_type.as_deref(), Some("sqlite"));

    let schema = state.schema_text.as_deref().unwrap();
    assert!(schema.contains("Table: orders"));
    assert!(schema.contains("Table: users"));
    assert!(schema.contains("  - email (TEXT) [Not Null]"));
    assert!(schema.contains("  - total (REAL) [Default: 0]"));
    assert!(schema.contains("  Foreign Key: user_id -> users.id"));

    orchestrator.close().await;
}

#[tokio::test]
async fn test_question_to_results() {
    let dir = tempfile::tempdir().unwrap();
    let url = seeded_database(&dir).await;
    let llm = MockLlmClient::new().with_reasoning();
    let prompts = llm.clone();
    let mut orchestrator = Orchestrator::with_drivers(Box::new(llm));

    orchestrator.dispatch(Command::Connect(url)).await;
    let generated = orchestrator
        .dispatch(Command::SubmitQuestion("Show me all users".to_string()))
        .await;

    assert!(matches!(&generated[0], CommandOutput::Expandable { .. }));
    assert_eq!(orchestrator.state().status, SessionStatus::SqlReady);
    assert!(prompts.prompts()[0].contains("- Database Type: sqlite"));

    let outputs = orchestrator.dispatch(Command::Execute).await;
    assert_eq!(outputs[0], CommandOutput::info("Query Results:"));

    let (headers, rows) = table_of(&outputs).unwrap();
    assert_eq!(headers, &vec!["id", "email", "name"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["1", "ada@example.com", "Ada"]);
    assert_eq!(rows[1][2], "NULL");
    assert_eq!(orchestrator.state().status, SessionStatus::ResultsReady);

    orchestrator.close().await;
}

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let url = seeded_database(&dir).await;
    let llm = MockLlmClient::new().with_response(
        "cleanup",
        "```sql\nDELETE FROM orders WHERE total < 5;\nSELECT * FROM missing_table;\nSELECT COUNT(*) AS n FROM orders;\n```",
    );
    let mut orchestrator = Orchestrator::with_drivers(Box::new(llm));

    orchestrator.dispatch(Command::Connect(url)).await;
    orchestrator
        .dispatch(Command::SubmitQuestion("cleanup small orders".to_string()))
        .await;
    let outputs = orchestrator.dispatch(Command::Execute).await;

    let state = orchestrator.state();
    assert_eq!(state.outcomes.len(), 3);
    assert!(matches!(
        state.outcomes[0].result,
        Ok(StatementResult::Affected(1))
    ));
    assert!(state.outcomes[1].result.is_err());
    assert!(state.outcomes[2].is_ok());
    assert!(matches!(state.status, SessionStatus::ExecutionFailed(_)));

    assert!(outputs.iter().any(|output| matches!(output,
        CommandOutput::Error(text) if text.starts_with("Error executing statement: SELECT\n"))));

    let (headers, rows) = table_of(&outputs).unwrap();
    assert_eq!(headers, &vec!["n"]);
    assert_eq!(rows, &vec![vec!["2".to_string()]]);

    orchestrator.close().await;
}

#[tokio::test]
async fn test_user_sql_mutations_persist() {
    let dir = tempfile::tempdir().unwrap();
    let url = seeded_database(&dir).await;
    let mut orchestrator = Orchestrator::with_drivers(Box::new(MockLlmClient::new()));

    orchestrator.dispatch(Command::Connect(url.clone())).await;
    let outputs = orchestrator
        .dispatch(Command::ExecuteSql(
            "UPDATE users SET name = 'Bob' WHERE name IS NULL; UPDATE users SET name = upper(name);"
                .to_string(),
        ))
        .await;
    assert_eq!(
        outputs,
        vec![
            CommandOutput::info("Query executed successfully. Rows affected: 1"),
            CommandOutput::info("Query executed successfully. Rows affected: 2"),
        ]
    );
    orchestrator.close().await;

    let client = connect(&url).await.unwrap();
    let result = client
        .execute("SELECT name FROM users ORDER BY id")
        .await
        .unwrap();
    let rows = result.rows().unwrap().display_rows();
    assert_eq!(rows, vec![vec!["ADA"], vec!["BOB"]]);
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_unanswerable_question_yields_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let url = seeded_database(&dir).await;
    let mut orchestrator = Orchestrator::with_drivers(Box::new(MockLlmClient::new()));

    orchestrator.dispatch(Command::Connect(url)).await;
    let outputs = orchestrator
        .dispatch(Command::SubmitQuestion("what is the meaning of life".to_string()))
        .await;

    assert_eq!(outputs.last().unwrap(), &CommandOutput::sql(NO_SQL_SENTINEL));
    let refused = orchestrator.dispatch(Command::Execute).await;
    assert!(refused[0].is_error());
    assert!(orchestrator.state().outcomes.is_empty());

    orchestrator.close().await;
}

#[tokio::test]
async fn test_connect_failures_are_reported() {
    let mut orchestrator = Orchestrator::with_drivers(Box::new(MockLlmClient::new()));

    orchestrator
        .dispatch(Command::Connect("mysql://root@localhost/shop".to_string()))
        .await;
    assert!(orchestrator
        .state()
        .connection_status
        .starts_with("Driver missing:"));

    let dir = tempfile::tempdir().unwrap();
    let bad = format!("sqlite:///{}/no/such/dir/x.db", dir.path().display());
    orchestrator.dispatch(Command::Connect(bad)).await;
    assert!(orchestrator
        .state()
        .connection_status
        .starts_with("Connection failed:"));
    assert!(!orchestrator.state().is_connected());
}
