//! Help text for interactive commands.

/// Help text displayed for the /help command.
pub const HELP_TEXT: &str = r#"Ask a question in plain language to generate SQL, or use a command:
  /connect <url>    - Connect to a database (postgres://..., sqlite:...)
  /run              - Execute the generated SQL
  /sql <statements> - Execute SQL directly
  /schema           - Display the database schema
  /status           - Show the connection status
  /help             - Show this help message
  /quit, /exit      - Exit"#;
