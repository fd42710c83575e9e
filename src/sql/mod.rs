//! SQL text utilities: formatting, statement splitting and statement kinds.

mod format;
mod kind;
mod split;

pub use format::format_sql;
pub use kind::{classify_statement, is_comment_only, StatementKind};
pub use split::split_statements;
