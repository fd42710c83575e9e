//! Transport-agnostic command output types.
//!
//! These types represent command results in a way that is independent of the
//! presentation layer. The terminal renderer converts them for display; tests
//! inspect them directly.

/// Output from a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Informational message (success, status, etc.).
    Info(String),

    /// Error message.
    Error(String),

    /// Connection status badge.
    Status {
        /// Whether a database is connected.
        connected: bool,
        /// Status text shown next to the badge.
        text: String,
    },

    /// A block of code, e.g. one generated SQL statement.
    Code {
        /// Language tag for highlighting.
        language: String,
        /// Code text.
        text: String,
    },

    /// Structured table data for display.
    Table {
        /// Column headers.
        headers: Vec<String>,
        /// Row data (each row is a vector of cell values).
        rows: Vec<Vec<String>>,
    },

    /// Collapsible section, used for the model's reasoning.
    Expandable {
        /// Section title.
        title: String,
        /// Section body (markdown).
        body: String,
    },
}

impl CommandOutput {
    /// Creates an info message.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// Creates an error message.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Creates a status badge.
    pub fn status(connected: bool, text: impl Into<String>) -> Self {
        Self::Status {
            connected,
            text: text.into(),
        }
    }

    /// Creates a SQL code block.
    pub fn sql(text: impl Into<String>) -> Self {
        Self::Code {
            language: "sql".to_string(),
            text: text.into(),
        }
    }

    /// Creates a table output.
    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table { headers, rows }
    }

    /// Creates a collapsible section.
    pub fn expandable(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Expandable {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Returns true for error output.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
