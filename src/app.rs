//! Core orchestrator for sqlquill.
//!
//! Owns the session state and drives the pipeline: connect and introspect,
//! turn a question into SQL through the model, and execute the result one
//! statement at a time. Every user action arrives as a [`Command`] and
//! produces a list of [`CommandOutput`] values for the presentation layer.

use tracing::{debug, info, warn};

use crate::commands::{Command, CommandOutput, HELP_TEXT};
use crate::config::redact_password;
use crate::db::{
    detect_database_type, Connector, DatabaseClient, DriverConnector, StatementResult,
    UNKNOWN_DATABASE_TYPE,
};
use crate::error::QuillError;
use crate::llm::{build_prompt, parse_response, LlmClient, ParsedResponse, NO_SQL_SENTINEL};
use crate::sql::{format_sql, is_comment_only, split_statements};

/// Status text before any connection attempt.
pub const NOT_CONNECTED: &str = "Not connected";

/// Status text after a successful connection.
pub const CONNECTED: &str = "Connected successfully";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No connection has been attempted.
    #[default]
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected and introspected; nothing asked yet.
    Connected,
    /// The last connection attempt failed.
    ConnectFailed(String),
    /// Connected; waiting for a question.
    AwaitingQuery,
    /// The model is generating SQL.
    GeneratingSql,
    /// SQL has been generated and can be executed.
    SqlReady,
    /// Statements are being executed.
    Executing,
    /// Every statement executed successfully.
    ResultsReady,
    /// At least one statement failed.
    ExecutionFailed(String),
}

/// Outcome of one executed statement.
#[derive(Debug)]
pub struct StatementOutcome {
    /// The statement as executed.
    pub statement: String,
    /// Rows, an affected-row count, or the execution error.
    pub result: Result<StatementResult, QuillError>,
}

impl StatementOutcome {
    /// Returns true if the statement executed without error.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything the session knows. Reset wholesale on reconnect and per question.
#[derive(Debug)]
pub struct SessionState {
    pub status: SessionStatus,
    pub descriptor: Option<String>,
    pub db_type: Option<String>,
    pub schema_text: Option<String>,
    pub connection_status: String,
    pub question: Option<String>,
    pub parsed: Option<ParsedResponse>,
    pub generated_sql: Option<String>,
    pub outcomes: Vec<StatementOutcome>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            descriptor: None,
            db_type: None,
            schema_text: None,
            connection_status: NOT_CONNECTED.to_string(),
            question: None,
            parsed: None,
            generated_sql: None,
            outcomes: Vec::new(),
        }
    }
}

impl SessionState {
    /// Drops the generated SQL and everything derived from it.
    fn reset_query(&mut self) {
        self.question = None;
        self.parsed = None;
        self.generated_sql = None;
        self.outcomes.clear();
    }

    /// Returns true if the connection status marks a live connection.
    pub fn is_connected(&self) -> bool {
        self.connection_status.starts_with("Connected")
    }
}

/// The main orchestrator that coordinates all components.
pub struct Orchestrator {
    state: SessionState,
    db: Option<Box<dyn DatabaseClient>>,
    llm: Box<dyn LlmClient>,
    connector: Box<dyn Connector>,
}

impl Orchestrator {
    /// Creates an orchestrator that connects through `connector`.
    pub fn new(llm: Box<dyn LlmClient>, connector: Box<dyn Connector>) -> Self {
        Self {
            state: SessionState::default(),
            db: None,
            llm,
            connector,
        }
    }

    /// Creates an orchestrator backed by the compiled-in database drivers.
    pub fn with_drivers(llm: Box<dyn LlmClient>) -> Self {
        Self::new(llm, Box::new(DriverConnector))
    }

    /// Returns the session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Dispatches one command and returns what should be shown.
    pub async fn dispatch(&mut self, command: Command) -> Vec<CommandOutput> {
        debug!("Dispatching {:?}", command);
        match command {
            Command::Connect(descriptor) => self.connect(&descriptor).await,
            Command::SubmitQuestion(question) => self.submit_question(&question).await,
            Command::Execute => self.execute_generated().await,
            Command::ExecuteSql(sql) => self.execute_user_sql(&sql).await,
            Command::ShowSchema => self.show_schema(),
            Command::ShowStatus => self.show_status(),
            Command::Help => vec![CommandOutput::info(HELP_TEXT)],
            Command::Quit => {
                self.close().await;
                vec![CommandOutput::info("Goodbye.")]
            }
            Command::Unknown(name) => vec![CommandOutput::error(format!(
                "Unknown command: {name}. Type /help for available commands."
            ))],
        }
    }

    /// Closes the current database handle, if any.
    pub async fn close(&mut self) {
        if let Some(db) = self.db.take() {
            if let Err(e) = db.close().await {
                warn!("Failed to close database handle: {}", e);
            }
        }
    }

    async fn connect(&mut self, descriptor: &str) -> Vec<CommandOutput> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return vec![CommandOutput::error("Usage: /connect <database url>")];
        }

        self.close().await;
        self.state = SessionState {
            status: SessionStatus::Connecting,
            descriptor: Some(descriptor.to_string()),
            ..SessionState::default()
        };

        let redacted = redact_password(descriptor);
        info!("Connecting to {}", redacted);

        let db = match self.connector.connect(descriptor).await {
            Ok(db) => db,
            Err(e) => return self.connect_failed(e),
        };

        let schema = match db.introspect_schema().await {
            Ok(schema) => schema,
            Err(e) => {
                if let Err(close_err) = db.close().await {
                    warn!("Failed to close database handle: {}", close_err);
                }
                return self.connect_failed(e);
            }
        };

        let db_type = detect_database_type(descriptor);
        info!(
            "Connected to {} ({}, {} tables)",
            redacted,
            db_type,
            schema.tables.len()
        );

        self.db = Some(db);
        self.state.schema_text = Some(schema.render());
        self.state.db_type = Some(db_type.clone());
        self.state.connection_status = CONNECTED.to_string();
        self.state.status = SessionStatus::Connected;

        vec![
            CommandOutput::status(true, CONNECTED),
            CommandOutput::info(format!(
                "Database type: {db_type} ({} tables)",
                schema.tables.len()
            )),
        ]
    }

    fn connect_failed(&mut self, error: QuillError) -> Vec<CommandOutput> {
        debug_assert!(error.is_connect_error());
        let message = error.to_string();
        warn!("Connection failed ({}): {}", error.category(), message);

        self.state.connection_status = message.clone();
        self.state.status = SessionStatus::ConnectFailed(message.clone());
        vec![CommandOutput::status(false, message)]
    }

    async fn submit_question(&mut self, question: &str) -> Vec<CommandOutput> {
        if self.db.is_none() {
            return vec![not_connected_error()];
        }

        self.state.reset_query();

        let question = question.trim();
        if question.is_empty() {
            self.state.status = SessionStatus::AwaitingQuery;
            return Vec::new();
        }

        self.state.status = SessionStatus::GeneratingSql;
        self.state.question = Some(question.to_string());

        let prompt = build_prompt(
            self.state.db_type.as_deref().unwrap_or(UNKNOWN_DATABASE_TYPE),
            self.state.schema_text.as_deref().unwrap_or_default(),
            question,
        );

        let response = match self.llm.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Model request failed: {}", e);
                self.state.status = SessionStatus::AwaitingQuery;
                return vec![CommandOutput::error(e.to_string())];
            }
        };

        let parsed = parse_response(&response);
        let sql = format_sql(&parsed.sql);
        debug!("Generated SQL: {}", sql);

        let mut outputs = Vec::new();
        if let Some(reasoning) = &parsed.formatted_reasoning {
            outputs.push(CommandOutput::expandable("Model's reasoning", reasoning.clone()));
        }
        outputs.push(CommandOutput::info("Result(s):"));
        outputs.extend(split_statements(&sql).into_iter().map(CommandOutput::sql));

        self.state.parsed = Some(parsed);
        self.state.generated_sql = Some(sql);
        self.state.status = SessionStatus::SqlReady;
        outputs
    }

    async fn execute_generated(&mut self) -> Vec<CommandOutput> {
        if self.db.is_none() {
            return vec![not_connected_error()];
        }

        let Some(sql) = self.state.generated_sql.clone() else {
            return vec![CommandOutput::error(
                "No SQL has been generated yet. Ask a question first.",
            )];
        };

        if sql == NO_SQL_SENTINEL {
            return vec![CommandOutput::error(
                "Nothing to execute: the model did not produce a SQL query.",
            )];
        }

        self.execute_sql(&sql).await
    }

    async fn execute_user_sql(&mut self, sql: &str) -> Vec<CommandOutput> {
        if self.db.is_none() {
            return vec![not_connected_error()];
        }
        if sql.trim().is_empty() {
            return vec![CommandOutput::error("Usage: /sql <statements>")];
        }
        self.execute_sql(sql).await
    }

    /// Runs each statement independently; a failure does not stop the rest.
    async fn execute_sql(&mut self, sql: &str) -> Vec<CommandOutput> {
        let Some(db) = self.db.as_ref() else {
            return vec![not_connected_error()];
        };

        let statements: Vec<String> = split_statements(sql)
            .into_iter()
            .filter(|statement| !is_comment_only(statement))
            .collect();

        if statements.is_empty() {
            return vec![CommandOutput::error("No executable statements found.")];
        }

        self.state.status = SessionStatus::Executing;
        self.state.outcomes.clear();

        let mut outputs = Vec::new();
        let mut outcomes = Vec::with_capacity(statements.len());

        for statement in statements {
            let result = db.execute(&statement).await;
            outputs.extend(outcome_outputs(&result));
            outcomes.push(StatementOutcome { statement, result });
        }

        let total = outcomes.len();
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!("Executed {} statements, {} failed", total, failed);

        self.state.status = if failed == 0 {
            SessionStatus::ResultsReady
        } else {
            SessionStatus::ExecutionFailed(format!("{failed} of {total} statements failed"))
        };
        self.state.outcomes = outcomes;
        outputs
    }

    fn show_schema(&self) -> Vec<CommandOutput> {
        match self.state.schema_text.as_deref() {
            None => vec![not_connected_error()],
            Some("") => vec![CommandOutput::info("The database has no tables.")],
            Some(schema) => vec![CommandOutput::info(schema.trim_end())],
        }
    }

    fn show_status(&self) -> Vec<CommandOutput> {
        let mut outputs = vec![CommandOutput::status(
            self.state.is_connected(),
            self.state.connection_status.clone(),
        )];

        if let (true, Some(descriptor), Some(db_type)) = (
            self.state.is_connected(),
            self.state.descriptor.as_deref(),
            self.state.db_type.as_deref(),
        ) {
            outputs.push(CommandOutput::info(format!(
                "{} ({db_type})",
                redact_password(descriptor)
            )));
        }
        outputs
    }
}

fn not_connected_error() -> CommandOutput {
    CommandOutput::error("Not connected. Use /connect <database url> first.")
}

fn outcome_outputs(result: &Result<StatementResult, QuillError>) -> Vec<CommandOutput> {
    match result {
        Ok(StatementResult::Rows(rows)) => {
            let mut outputs = vec![
                CommandOutput::info("Query Results:"),
                CommandOutput::table(rows.column_names(), rows.display_rows()),
            ];
            if let Some(warning) = rows.truncation_warning() {
                outputs.push(CommandOutput::info(warning));
            }
            outputs
        }
        Ok(StatementResult::Affected(count)) => vec![CommandOutput::info(format!(
            "Query executed successfully. Rows affected: {count}"
        ))],
        Err(e) => vec![CommandOutput::error(e.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Column, ForeignKey, MockDatabaseClient, Schema, Table};
    use crate::error::Result;
    use crate::llm::MockLlmClient;
    use async_trait::async_trait;

    fn sample_schema() -> Schema {
        Schema::with_tables(vec![
            Table::new("users")
                .column(Column::new("id", "integer").nullable(false))
                .column(Column::new("email", "varchar(255)").nullable(false))
                .primary_key(["id"]),
            Table::new("orders")
                .column(Column::new("id", "integer").nullable(false))
                .column(Column::new("user_id", "integer").nullable(false))
                .primary_key(["id"])
                .foreign_key(ForeignKey::new("user_id", "users", "id")),
        ])
    }

    /// Hands out clones of one mock client; fails for descriptors it is told to.
    struct MockConnector {
        client: MockDatabaseClient,
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn connect(&self, descriptor: &str) -> Result<Box<dyn DatabaseClient>> {
            if descriptor.starts_with("mysql") {
                return Err(QuillError::driver_missing("No module named 'pymysql'"));
            }
            if descriptor.contains("unreachable") {
                return Err(QuillError::connection("could not reach host"));
            }
            Ok(Box::new(self.client.clone()))
        }
    }

    fn orchestrator_with(llm: MockLlmClient, client: MockDatabaseClient) -> Orchestrator {
        Orchestrator::new(Box::new(llm), Box::new(MockConnector { client }))
    }

    async fn connected(llm: MockLlmClient, client: MockDatabaseClient) -> Orchestrator {
        let mut orchestrator = orchestrator_with(llm, client);
        orchestrator
            .dispatch(Command::Connect("postgresql://u:p@h/d".to_string()))
            .await;
        orchestrator
    }

    #[tokio::test]
    async fn test_initial_state() {
        let orchestrator = orchestrator_with(MockLlmClient::new(), MockDatabaseClient::new());
        let state = orchestrator.state();

        assert_eq!(state.status, SessionStatus::Disconnected);
        assert_eq!(state.connection_status, NOT_CONNECTED);
        assert!(!state.is_connected());
    }

    #[tokio::test]
    async fn test_connect_success() {
        let client = MockDatabaseClient::with_schema(sample_schema());
        let mut orchestrator = orchestrator_with(MockLlmClient::new(), client);

        let outputs = orchestrator
            .dispatch(Command::Connect("postgresql://u:p@h/d".to_string()))
            .await;

        assert_eq!(outputs[0], CommandOutput::status(true, "Connected successfully"));
        let state = orchestrator.state();
        assert_eq!(state.status, SessionStatus::Connected);
        assert_eq!(state.db_type.as_deref(), Some("postgresql"));
        assert_eq!(state.schema_text, Some(sample_schema().render()));
    }

    #[tokio::test]
    async fn test_connect_driver_missing() {
        let mut orchestrator = orchestrator_with(MockLlmClient::new(), MockDatabaseClient::new());

        let outputs = orchestrator
            .dispatch(Command::Connect("mysql://root@localhost/shop".to_string()))
            .await;

        let state = orchestrator.state();
        assert!(state.connection_status.starts_with("Driver missing:"));
        assert!(matches!(state.status, SessionStatus::ConnectFailed(_)));
        assert!(state.schema_text.is_none());
        assert!(matches!(&outputs[0], CommandOutput::Status { connected: false, .. }));
    }

    #[tokio::test]
    async fn test_connect_introspection_failure_closes_handle() {
        let client = MockDatabaseClient::new();
        let observer = client.clone();
        let mut orchestrator = orchestrator_with(MockLlmClient::new(), client);

        // Make introspection fail: list_tables names a table the mock cannot describe
        struct BrokenConnector(MockDatabaseClient);
        #[async_trait]
        impl Connector for BrokenConnector {
            async fn connect(&self, _descriptor: &str) -> Result<Box<dyn DatabaseClient>> {
                Ok(Box::new(BrokenIntrospection(self.0.clone())))
            }
        }
        struct BrokenIntrospection(MockDatabaseClient);
        #[async_trait]
        impl DatabaseClient for BrokenIntrospection {
            fn backend(&self) -> crate::db::DatabaseBackend {
                self.0.backend()
            }
            async fn list_tables(&self) -> Result<Vec<String>> {
                Ok(vec!["ghost".to_string()])
            }
            async fn get_columns(&self, table: &str) -> Result<Vec<Column>> {
                self.0.get_columns(table).await
            }
            async fn get_primary_key(&self, table: &str) -> Result<Vec<String>> {
                self.0.get_primary_key(table).await
            }
            async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
                self.0.get_foreign_keys(table).await
            }
            async fn execute(&self, statement: &str) -> Result<StatementResult> {
                self.0.execute(statement).await
            }
            async fn close(&self) -> Result<()> {
                self.0.close().await
            }
        }
        orchestrator.connector = Box::new(BrokenConnector(observer.clone()));

        orchestrator
            .dispatch(Command::Connect("postgres://h/d".to_string()))
            .await;

        let state = orchestrator.state();
        assert!(state.connection_status.starts_with("Connection failed:"));
        assert!(state.schema_text.is_none());
        assert!(observer.is_closed());
    }

    #[tokio::test]
    async fn test_reconnect_resets_state() {
        let client = MockDatabaseClient::with_schema(sample_schema());
        let first = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        orchestrator
            .dispatch(Command::SubmitQuestion("show users".to_string()))
            .await;
        assert!(orchestrator.state().generated_sql.is_some());

        orchestrator
            .dispatch(Command::Connect("postgres://unreachable/d".to_string()))
            .await;

        let state = orchestrator.state();
        assert!(first.is_closed());
        assert!(state.generated_sql.is_none());
        assert!(state.parsed.is_none());
        assert!(state.schema_text.is_none());
        assert!(state.db_type.is_none());
        assert_eq!(
            state.connection_status,
            "Connection failed: could not reach host"
        );
    }

    #[tokio::test]
    async fn test_question_requires_connection() {
        let mut orchestrator = orchestrator_with(MockLlmClient::new(), MockDatabaseClient::new());
        let outputs = orchestrator
            .dispatch(Command::SubmitQuestion("show users".to_string()))
            .await;

        assert!(outputs[0].is_error());
        assert_eq!(orchestrator.state().status, SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_submit_question_generates_sql() {
        let llm = MockLlmClient::new().with_reasoning();
        let prompts = llm.clone();
        let mut orchestrator = connected(llm, MockDatabaseClient::with_schema(sample_schema())).await;

        let outputs = orchestrator
            .dispatch(Command::SubmitQuestion("Show me all users".to_string()))
            .await;

        let state = orchestrator.state();
        assert_eq!(state.status, SessionStatus::SqlReady);
        let sql = state.generated_sql.as_deref().unwrap();
        assert!(sql.contains("SELECT"));
        assert!(sql.contains("users"));

        assert!(matches!(
            &outputs[0],
            CommandOutput::Expandable { title, body }
                if title == "Model's reasoning" && body.contains("`users`")
        ));
        assert_eq!(outputs[1], CommandOutput::info("Result(s):"));
        assert!(matches!(&outputs[2], CommandOutput::Code { language, .. } if language == "sql"));

        let prompt = &prompts.prompts()[0];
        assert!(prompt.contains("- Database Type: postgresql"));
        assert!(prompt.contains("Table: orders"));
        assert!(prompt.contains("- User Question: Show me all users"));
    }

    #[tokio::test]
    async fn test_blank_question_awaits() {
        let mut orchestrator = connected(MockLlmClient::new(), MockDatabaseClient::new()).await;
        let outputs = orchestrator
            .dispatch(Command::SubmitQuestion("   ".to_string()))
            .await;

        assert!(outputs.is_empty());
        assert_eq!(orchestrator.state().status, SessionStatus::AwaitingQuery);
        assert!(orchestrator.state().generated_sql.is_none());
    }

    #[tokio::test]
    async fn test_model_failure_returns_to_awaiting() {
        let mut orchestrator =
            connected(MockLlmClient::failing("model not loaded"), MockDatabaseClient::new()).await;

        let outputs = orchestrator
            .dispatch(Command::SubmitQuestion("show users".to_string()))
            .await;

        assert_eq!(
            outputs,
            vec![CommandOutput::error("LLM error: model not loaded")]
        );
        assert_eq!(orchestrator.state().status, SessionStatus::AwaitingQuery);
    }

    #[tokio::test]
    async fn test_sentinel_is_not_executed() {
        let client = MockDatabaseClient::new();
        let observer = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        orchestrator
            .dispatch(Command::SubmitQuestion("what's the weather".to_string()))
            .await;
        assert_eq!(
            orchestrator.state().generated_sql.as_deref(),
            Some(NO_SQL_SENTINEL)
        );

        let outputs = orchestrator.dispatch(Command::Execute).await;
        assert!(outputs[0].is_error());
        assert!(observer.executed().is_empty());
        assert_eq!(orchestrator.state().status, SessionStatus::SqlReady);
    }

    #[tokio::test]
    async fn test_execute_without_generated_sql() {
        let mut orchestrator = connected(MockLlmClient::new(), MockDatabaseClient::new()).await;
        let outputs = orchestrator.dispatch(Command::Execute).await;
        assert!(outputs[0].is_error());
    }

    #[tokio::test]
    async fn test_execute_generated_sql() {
        let client = MockDatabaseClient::new();
        let observer = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        orchestrator
            .dispatch(Command::SubmitQuestion("count the users".to_string()))
            .await;
        let outputs = orchestrator.dispatch(Command::Execute).await;

        assert_eq!(orchestrator.state().status, SessionStatus::ResultsReady);
        assert_eq!(observer.executed().len(), 1);
        assert_eq!(outputs[0], CommandOutput::info("Query Results:"));
        assert!(matches!(&outputs[1], CommandOutput::Table { headers, .. } if headers == &["result"]));
    }

    #[tokio::test]
    async fn test_statements_execute_independently() {
        let client = MockDatabaseClient::new().fail_on("broken");
        let observer = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        let outputs = orchestrator
            .dispatch(Command::ExecuteSql(
                "SELECT 1; SELECT * FROM broken; DELETE FROM t WHERE id = 2;".to_string(),
            ))
            .await;

        assert_eq!(
            observer.executed(),
            vec!["SELECT 1;", "SELECT * FROM broken;", "DELETE FROM t WHERE id = 2;"]
        );

        let state = orchestrator.state();
        assert_eq!(state.outcomes.len(), 3);
        assert!(state.outcomes[0].is_ok());
        assert!(!state.outcomes[1].is_ok());
        assert!(state.outcomes[2].is_ok());
        assert_eq!(
            state.status,
            SessionStatus::ExecutionFailed("1 of 3 statements failed".to_string())
        );

        let error = outputs.iter().find(|o| o.is_error()).unwrap();
        assert!(matches!(error, CommandOutput::Error(text)
            if text.starts_with("Error executing statement: SELECT * FROM broken;\n")));
        assert_eq!(
            outputs.last().unwrap(),
            &CommandOutput::info("Query executed successfully. Rows affected: 1")
        );
    }

    #[tokio::test]
    async fn test_comment_only_statements_are_skipped() {
        let client = MockDatabaseClient::new();
        let observer = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        let outputs = orchestrator
            .dispatch(Command::ExecuteSql("-- just a note".to_string()))
            .await;
        assert!(outputs[0].is_error());
        assert!(observer.executed().is_empty());
    }

    #[tokio::test]
    async fn test_show_schema_and_status() {
        let mut orchestrator =
            connected(MockLlmClient::new(), MockDatabaseClient::with_schema(sample_schema())).await;

        let schema = orchestrator.dispatch(Command::ShowSchema).await;
        assert!(matches!(&schema[0], CommandOutput::Info(text) if text.starts_with("Table: users")));

        let status = orchestrator.dispatch(Command::ShowStatus).await;
        assert_eq!(status[0], CommandOutput::status(true, "Connected successfully"));
        assert_eq!(status[1], CommandOutput::info("postgresql://u:****@h/d (postgresql)"));
    }

    #[tokio::test]
    async fn test_help_quit_and_unknown() {
        let client = MockDatabaseClient::new();
        let observer = client.clone();
        let mut orchestrator = connected(MockLlmClient::new(), client).await;

        let help = orchestrator.dispatch(Command::Help).await;
        assert!(matches!(&help[0], CommandOutput::Info(text) if text.contains("/connect")));

        let unknown = orchestrator.dispatch(Command::Unknown("/vim".to_string())).await;
        assert!(unknown[0].is_error());

        orchestrator.dispatch(Command::Quit).await;
        assert!(observer.is_closed());
    }
}
