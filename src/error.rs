//! Error types for sqlquill.
//!
//! Every failure the session can surface maps onto one variant here. The
//! `Display` text of each variant is what the user sees as status text.

use thiserror::Error;

/// Main error type for sqlquill operations.
#[derive(Error, Debug)]
pub enum QuillError {
    /// The database driver for the requested scheme is not compiled in.
    #[error("Driver missing: {0}")]
    DriverMissing(String),

    /// Connecting or introspecting failed (host unreachable, auth failed, bad URL, etc.)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Anything else that went wrong while connecting or introspecting.
    #[error("Unexpected error: {0}")]
    UnexpectedConnection(String),

    /// A single statement of a batch failed to execute.
    #[error("Error executing statement: {statement}\n{message}")]
    Statement { statement: String, message: String },

    /// Language model errors (server down, timeouts, malformed replies).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, unknown provider, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuillError {
    /// Creates a driver-missing error with the given message.
    pub fn driver_missing(msg: impl Into<String>) -> Self {
        Self::DriverMissing(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an unexpected connection error with the given message.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedConnection(msg.into())
    }

    /// Creates a statement execution error.
    pub fn statement(statement: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Statement {
            statement: statement.into(),
            message: msg.into(),
        }
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DriverMissing(_) => "Driver Missing",
            Self::Connection(_) => "Connection Error",
            Self::UnexpectedConnection(_) => "Unexpected Error",
            Self::Statement { .. } => "Statement Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for the errors a connect attempt can end in.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            Self::DriverMissing(_) | Self::Connection(_) | Self::UnexpectedConnection(_)
        )
    }
}

/// Result type alias using QuillError.
pub type Result<T> = std::result::Result<T, QuillError>;
