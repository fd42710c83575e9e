//! Mock database client for testing.
//!
//! Serves a fixed schema and canned statement results, records every executed
//! statement, and fails statements that contain a configured pattern.

use super::{
    Column, ColumnInfo, DatabaseBackend, DatabaseClient, ForeignKey, QueryResult, Schema,
    StatementResult, Value,
};
use crate::error::{QuillError, Result};
use crate::sql::{classify_statement, StatementKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A mock database client that returns predefined results.
#[derive(Debug, Clone)]
pub struct MockDatabaseClient {
    backend: DatabaseBackend,
    schema: Schema,
    failing_patterns: Vec<String>,
    executed: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self {
            backend: DatabaseBackend::Postgres,
            schema: Schema::default(),
            failing_patterns: Vec::new(),
            executed: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a new mock database client with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::new()
        }
    }

    /// Sets the backend the mock reports.
    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Makes every statement containing `pattern` fail.
    pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
        self.failing_patterns.push(pattern.into());
        self
    }

    /// Statements executed so far, in order. Shared with all clones.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Returns true once `close` has been called on this client or a clone.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn table(&self, name: &str) -> Result<&super::Table> {
        self.schema
            .tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| QuillError::connection(format!("relation \"{name}\" does not exist")))
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.schema.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<Column>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn execute(&self, statement: &str) -> Result<StatementResult> {
        if let Ok(mut log) = self.executed.lock() {
            log.push(statement.to_string());
        }

        if let Some(pattern) = self
            .failing_patterns
            .iter()
            .find(|pattern| statement.contains(pattern.as_str()))
        {
            return Err(QuillError::statement(
                statement,
                format!("mock failure on '{pattern}'"),
            ));
        }

        match classify_statement(statement, Some(self.backend)) {
            StatementKind::Rows => {
                let columns = vec![ColumnInfo::new("result", "text")];
                let rows = vec![vec![Value::String(format!("Mock result for: {statement}"))]];
                Ok(StatementResult::Rows(
                    QueryResult::with_data(columns, rows)
                        .with_execution_time(Duration::from_millis(1)),
                ))
            }
            StatementKind::Mutation => Ok(StatementResult::Affected(1)),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
