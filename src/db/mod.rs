//! Database abstraction layer for sqlquill.
//!
//! Provides a trait-based interface for the handful of operations the
//! pipeline needs from a database (introspection and statement execution),
//! plus the connection-descriptor helpers that pick a backend.

mod mock;
mod postgres;
mod schema;
mod sqlite;
mod types;

pub use mock::MockDatabaseClient;
pub use postgres::PostgresClient;
pub use schema::{Column, ForeignKey, Schema, Table};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, StatementResult, Value, MAX_ROWS};

use crate::error::{QuillError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Label used when a descriptor has no recognizable scheme.
pub const UNKNOWN_DATABASE_TYPE: &str = "Unknown";

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)://").expect("scheme pattern is valid"));

/// Returns the scheme token of a connection descriptor.
///
/// `"postgresql://u:p@h/d"` gives `"postgresql"`; anything that does not start
/// with `<word>://` gives `"Unknown"`.
pub fn detect_database_type(descriptor: &str) -> String {
    SCHEME_RE
        .captures(descriptor)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| UNKNOWN_DATABASE_TYPE.to_string(), |m| m.as_str().to_string())
}

/// Dialects that are recognized but have no driver compiled in.
const KNOWN_WITHOUT_DRIVER: &[&str] = &["mysql", "mariadb", "mssql", "oracle"];

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a scheme token, ignoring any `+driver` suffix.
    pub fn parse(scheme: &str) -> Option<Self> {
        let dialect = scheme.split('+').next().unwrap_or(scheme);
        match dialect.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Resolves the backend for a connection descriptor.
    ///
    /// Recognized dialects without a compiled driver are reported as
    /// [`QuillError::DriverMissing`]; anything else unrecognized is a
    /// connection failure.
    pub fn from_descriptor(descriptor: &str) -> Result<Self> {
        let scheme = descriptor
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
            .ok_or_else(|| {
                QuillError::connection(format!(
                    "Could not parse a database URL from '{descriptor}'"
                ))
            })?;

        if let Some(backend) = Self::parse(scheme) {
            return Ok(backend);
        }

        let dialect = scheme.split('+').next().unwrap_or(scheme).to_lowercase();
        if KNOWN_WITHOUT_DRIVER.contains(&dialect.as_str()) {
            Err(QuillError::driver_missing(format!(
                "no driver for '{dialect}' is compiled into this build (available: postgres, sqlite)"
            )))
        } else {
            Err(QuillError::connection(format!(
                "unsupported database scheme '{scheme}'"
            )))
        }
    }

    /// Rewrites the descriptor into the form the driver accepts.
    ///
    /// `postgresql+psycopg2://…` becomes `postgres://…`. SQLite URLs follow
    /// SQLAlchemy: `sqlite:///app.db` is relative, `sqlite:////var/app.db` is
    /// absolute and a bare `sqlite://` is an in-memory database.
    pub fn normalize_descriptor(&self, descriptor: &str) -> String {
        let Some((_, rest)) = descriptor.split_once(':') else {
            return descriptor.to_string();
        };

        match self {
            Self::Postgres => format!("postgres:{rest}"),
            Self::Sqlite => match rest.strip_prefix("//") {
                Some("") => "sqlite::memory:".to_string(),
                Some(after) => match after.strip_prefix('/') {
                    Some(path) => format!("sqlite:{path}"),
                    None => format!("sqlite://{after}"),
                },
                None => format!("sqlite:{rest}"),
            },
        }
    }
}

/// Creates a database client for the given connection descriptor.
///
/// This is the central factory function for database connections.
pub async fn connect(descriptor: &str) -> Result<Box<dyn DatabaseClient>> {
    let backend = DatabaseBackend::from_descriptor(descriptor)?;
    let url = backend.normalize_descriptor(descriptor);
    debug!("Connecting with backend {}", backend.as_str());

    match backend {
        DatabaseBackend::Postgres => Ok(Box::new(PostgresClient::connect(&url).await?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::connect(&url).await?)),
    }
}

/// Opens database handles for the orchestrator.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a handle for `descriptor`.
    async fn connect(&self, descriptor: &str) -> Result<Box<dyn DatabaseClient>>;
}

/// Connector backed by the compiled-in sqlx drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConnector;

#[async_trait]
impl Connector for DriverConnector {
    async fn connect(&self, descriptor: &str) -> Result<Box<dyn DatabaseClient>> {
        connect(descriptor).await
    }
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with QuillError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Returns the backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Lists user tables in introspection order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Lists the columns of `table` in declaration order.
    async fn get_columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Lists the primary key columns of `table`.
    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>>;

    /// Lists the foreign keys declared on `table`.
    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>>;

    /// Executes a single statement.
    async fn execute(&self, statement: &str) -> Result<StatementResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;

    /// Introspects every table into a [`Schema`], keeping table order.
    async fn introspect_schema(&self) -> Result<Schema> {
        let names = self.list_tables().await?;
        let mut tables = Vec::with_capacity(names.len());

        for name in names {
            let columns = self.get_columns(&name).await?;
            let primary_key = self.get_primary_key(&name).await?;
            let foreign_keys = self.get_foreign_keys(&name).await?;
            tables.push(Table {
                name,
                columns,
                primary_key,
                foreign_keys,
            });
        }

        debug!("Introspected {} tables", tables.len());
        Ok(Schema::with_tables(tables))
    }
}

/// Maps a sqlx error raised while connecting or introspecting.
///
/// Reachability, authentication and URL problems are connection failures;
/// everything else is unexpected.
pub(crate) fn classify_connect_error(error: sqlx::Error) -> QuillError {
    match error {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Database(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => QuillError::connection(error.to_string()),
        other => QuillError::unexpected(other.to_string()),
    }
}
