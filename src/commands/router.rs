//! Command parsing for sqlquill.
//!
//! Parses a line of user input into a structured command for the orchestrator.

/// Parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect to the database named by a descriptor.
    Connect(String),
    /// Ask a natural-language question.
    SubmitQuestion(String),
    /// Execute the most recently generated SQL.
    Execute,
    /// Execute user-supplied SQL.
    ExecuteSql(String),
    /// Display the rendered database schema.
    ShowSchema,
    /// Display the connection status.
    ShowStatus,
    /// Show help message.
    Help,
    /// Exit the application.
    Quit,
    /// A `/command` that is not recognized.
    Unknown(String),
}

/// Parses user input into commands.
pub struct CommandRouter;

impl CommandRouter {
    /// Parses a line of input.
    ///
    /// Lines starting with `/` are commands; anything else is a question.
    pub fn parse(input: &str) -> Command {
        let input = input.trim();

        if !input.starts_with('/') {
            return Command::SubmitQuestion(input.to_string());
        }

        let (command, args) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(command, args)| (command, args.trim()));

        match command.to_lowercase().as_str() {
            "/connect" => Command::Connect(args.to_string()),
            "/run" | "/execute" => Command::Execute,
            "/sql" => Command::ExecuteSql(args.to_string()),
            "/schema" => Command::ShowSchema,
            "/status" => Command::ShowStatus,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}
