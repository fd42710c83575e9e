//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::db::{
    classify_connect_error, Column, ColumnInfo, DatabaseBackend, DatabaseClient, ForeignKey,
    QueryResult, Row, StatementResult, Value,
};
use crate::error::{QuillError, Result};
use crate::sql::{classify_statement, StatementKind};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Statement timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Creates a new PostgresClient from an existing connection pool.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`, retrying transient failures.
    ///
    /// The pool holds a single connection so that every statement of a batch
    /// runs in the same session.
    pub async fn connect(url: &str) -> Result<Self> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if !is_transient {
                        break;
                    }
                    if attempt < MAX_RETRY_ATTEMPTS {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                    }
                }
            }
        }

        match last_error {
            Some(error) => Err(map_connection_error(error, url)),
            None => Err(QuillError::internal("no connection attempt was made")),
        }
    }

    /// Best-effort column metadata for a statement that returned no rows.
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
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<Column>> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT
                column_name::text,
                data_type::text,
                is_nullable::text,
                column_default::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| Column {
                name,
                data_type,
                is_nullable: is_nullable == "YES",
                default,
            })
            .collect())
    }

    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT kcu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = 'public'
                AND tc.table_name = $1
                AND tc.constraint_type = 'PRIMARY KEY'
            ORDER BY kcu.ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        // One row per constraint, described by its first column pair
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT
                src.attname::text AS from_column,
                ref_table.relname::text AS to_table,
                dst.attname::text AS to_column
            FROM pg_constraint con
            JOIN pg_class tbl ON tbl.oid = con.conrelid
            JOIN pg_namespace ns ON ns.oid = tbl.relnamespace
            JOIN pg_class ref_table ON ref_table.oid = con.confrelid
            JOIN pg_attribute src
                ON src.attrelid = con.conrelid AND src.attnum = con.conkey[1]
            JOIN pg_attribute dst
                ON dst.attrelid = con.confrelid AND dst.attnum = con.confkey[1]
            WHERE con.contype = 'f'
                AND ns.nspname = 'public'
                AND tbl.relname = $1
            ORDER BY con.conname
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_connect_error)?;

        Ok(rows
            .into_iter()
            .map(|(column, to_table, to_column)| ForeignKey::new(column, to_table, to_column))
            .collect())
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

        match classify_statement(statement, Some(DatabaseBackend::Postgres)) {
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

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::Bool),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, |v| Value::Int(i64::from(v))),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, |v| Value::Int(i64::from(v))),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::Int),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, |v| Value::Float(f64::from(v))),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::Float),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::Bytes),

        // For all other types, try to get as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::String),
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-facing messages.
///
/// Only the host, port, user and database name are taken from the URL; the
/// password never appears in the message.
fn map_connection_error(error: sqlx::Error, url: &str) -> QuillError {
    let parsed = Url::parse(url).ok();
    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string());
    let port = parsed.as_ref().and_then(Url::port).unwrap_or(5432);
    let user = parsed
        .as_ref()
        .map(|u| u.username().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let database = parsed
        .as_ref()
        .map(|u| u.path().trim_start_matches('/').to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        QuillError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        QuillError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        QuillError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        QuillError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.",
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        QuillError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        classify_connect_error(error)
    }
}

/// Formats a statement error with the server's detail and hint, if any.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        let fields = [
            ("DETAIL", pg_error.detail()),
            ("HINT", pg_error.hint()),
            ("TABLE", pg_error.table()),
            ("COLUMN", pg_error.column()),
            ("CONSTRAINT", pg_error.constraint()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                result.push_str(&format!("\n  {label}: {value}"));
            }
        }
    }

    result
}
