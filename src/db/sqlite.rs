//! SQLite database client implementation.
//!
//! Introspects through the `pragma_*` table-valued functions so table names
//! are bound as parameters rather than spliced into the SQL text.

use crate::db::{
    classify_connect_error, Column, ColumnInfo, DatabaseBackend, DatabaseClient, ForeignKey,
    QueryResult, Row, StatementResult, Value,
};
use crate::error::{QuillError, Result};
use crate::sql::{classify_statement, StatementKind};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Statement timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens the database named by `url`, creating the file if it is missing.
    ///
    /// Takes sqlx URLs: `sqlite::memory:`, `sqlite:relative.db` and
    /// `sqlite:///absolute/path.db`. SQLAlchemy-style descriptors are
    /// rewritten by [`DatabaseBackend::normalize_descriptor`] first.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| QuillError::connection(format!("Invalid SQLite URL: {e}")))?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // One connection that never expires: an in-memory database lives
        // exactly as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(classify_connect_error)?;

        debug!("Opened SQLite database");
        Ok(Self { pool })
    }

    async fn describe_columns(&self, statement: &str) -> Vec<ColumnInfo> {
        match (&self.pool).describe(statement).await {
            Ok(describe) => describe
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            Err(e) => {
                debug!("Could not describe statement: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<Column>> {
        let rows: Vec<(String, String, i64, Option<String>)> = sqlx::query_as(
            r#"
            SELECT name, type, "notnull", dflt_value
            FROM pragma_table_info(?1)
            ORDER BY cid
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, notnull, default)| Column {
                name,
                data_type,
                is_nullable: notnull == 0,
                default,
            })
            .collect())
    }

    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name
            FROM pragma_table_info(?1)
            WHERE pk > 0
            ORDER BY pk
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT "from", "table", "to"
            FROM pragma_foreign_key_list(?1)
            WHERE seq = 0
            ORDER BY id
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)?;

        // One entry per constraint, described by its first column pair
        let mut foreign_keys = Vec::with_capacity(rows.len());
        for (column, referenced_table, referenced_column) in rows {
            // `REFERENCES parent` without a column list targets the parent's primary key
            let referenced_column = match referenced_column {
                Some(col) => col,
                None => self
                    .get_primary_key(&referenced_table)
                    .await?
                    .into_iter()
                    .next()
                    .unwrap_or_default(),
            };
            foreign_keys.push(ForeignKey::new(column, referenced_table, referenced_column));
        }

        Ok(foreign_keys)
    }

    async fn execute(&self, statement: &str) -> Result<StatementResult> {
        let start = Instant::now();
        let timeout = Duration::from_secs(QUERY_TIMEOUT_SECS);
        let timed_out = || {
            QuillError::statement(
                statement,
                format!("Query timed out after {QUERY_TIMEOUT_SECS} seconds"),
            )
        };

        match classify_statement(statement, Some(DatabaseBackend::Sqlite)) {
            StatementKind::Mutation => {
                let done = tokio::time::timeout(timeout, sqlx::query(statement).execute(&self.pool))
                    .await
                    .map_err(|_| timed_out())?
                    .map_err(|e| QuillError::statement(statement, format_query_error(e)))?;

                debug!("Statement affected {} rows", done.rows_affected());
                Ok(StatementResult::Affected(done.rows_affected()))
            }
            StatementKind::Rows => {
                let result =
                    tokio::time::timeout(timeout, sqlx::query(statement).fetch_all(&self.pool))
                        .await
                        .map_err(|_| timed_out())?
                        .map_err(|e| QuillError::statement(statement, format_query_error(e)))?;

                let execution_time = start.elapsed();

                let columns: Vec<ColumnInfo> = match result.first() {
                    Some(first_row) => first_row
                        .columns()
                        .iter()
                        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                        .collect(),
                    None => self.describe_columns(statement).await,
                };

                let rows: Vec<Row> = result.iter().map(convert_row).collect();
                let query_result =
                    QueryResult::with_data(columns, rows).with_execution_time(execution_time);

                if let Some(warning) = query_result.truncation_warning() {
                    warn!("{}", warning);
                }

                Ok(StatementResult::Rows(query_result))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|index| convert_value(row, index))
        .collect()
}

/// Decodes a cell by its storage class; SQLite column types are advisory.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" | "INT8" | "BIGINT" => row
            .try_get::<i64, _>(index)
            .map_or(Value::Null, Value::Int),
        "BOOLEAN" => row
            .try_get::<bool, _>(index)
            .map_or(Value::Null, Value::Bool),
        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<f64, _>(index)
            .map_or(Value::Null, Value::Float),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map_or(Value::Null, Value::Bytes),
        _ => row
            .try_get::<String, _>(index)
            .map_or(Value::Null, Value::String),
    }
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
