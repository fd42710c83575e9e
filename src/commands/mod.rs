//! Command parsing and output types for sqlquill.
//!
//! Keeps parsing separate from execution so commands can be tested without a
//! database or a model server.

pub mod help;
pub mod output;
pub mod router;

pub use help::HELP_TEXT;
pub use output::CommandOutput;
pub use router::{Command, CommandRouter};
