//! PostgreSQL integration tests.
//!
//! Skipped unless DATABASE_URL points at a reachable PostgreSQL database.

use sqlquill::app::{Orchestrator, SessionStatus};
use sqlquill::commands::{Command, CommandOutput};
use sqlquill::llm::MockLlmClient;

fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

async fn connected_orchestrator() -> Option<Orchestrator> {
    let url = get_test_database_url()?;
    let mut orchestrator = Orchestrator::with_drivers(Box::new(MockLlmClient::new()));
    orchestrator.dispatch(Command::Connect(url)).await;
    orchestrator
        .state()
        .is_connected()
        .then_some(orchestrator)
}

#[tokio::test]
async fn test_connect_detects_type() {
    let Some(mut orchestrator) = connected_orchestrator().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let db_type = orchestrator.state().db_type.clone().unwrap();
    assert!(db_type == "postgres" || db_type == "postgresql");
    assert!(orchestrator.state().schema_text.is_some());

    orchestrator.close().await;
}

#[tokio::test]
async fn test_batch_shares_one_session() {
    let Some(mut orchestrator) = connected_orchestrator().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outputs = orchestrator
        .dispatch(Command::ExecuteSql(
            "CREATE TEMP TABLE quill_notes (id serial PRIMARY KEY, body text);
             INSERT INTO quill_notes (body) VALUES ('a; b'), ('c') RETURNING id;
             SELECT body FROM quill_notes ORDER BY id;"
                .to_string(),
        ))
        .await;

    assert_eq!(orchestrator.state().status, SessionStatus::ResultsReady);
    assert_eq!(
        outputs[0],
        CommandOutput::info("Query executed successfully. Rows affected: 0")
    );

    let tables: Vec<_> = outputs
        .iter()
        .filter_map(|output| match output {
            CommandOutput::Table { rows, .. } => Some(rows.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].len(), 2);
    assert_eq!(tables[1], vec![vec!["a; b"], vec!["c"]]);

    orchestrator.close().await;
}

#[tokio::test]
async fn test_failed_statement_reports_database_message() {
    let Some(mut orchestrator) = connected_orchestrator().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outputs = orchestrator
        .dispatch(Command::ExecuteSql(
            "SELECT * FROM quill_missing_table; SELECT 1 AS one;".to_string(),
        ))
        .await;

    assert!(matches!(&outputs[0], CommandOutput::Error(text)
        if text.starts_with("Error executing statement: SELECT * FROM quill_missing_table;\n")
            && text.contains("quill_missing_table")));
    assert!(matches!(
        orchestrator.state().status,
        SessionStatus::ExecutionFailed(_)
    ));
    assert!(orchestrator.state().outcomes[1].is_ok());

    orchestrator.close().await;
}
