//! SQL pretty-printing for display.

use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::llm::NO_SQL_SENTINEL;

/// Re-indents `sql` and upper-cases its keywords.
///
/// The no-SQL sentinel and blank input are returned unchanged.
pub fn format_sql(sql: &str) -> String {
    if sql == NO_SQL_SENTINEL || sql.trim().is_empty() {
        return sql.to_string();
    }

    let options = FormatOptions {
        indent: Indent::Spaces(2),
        uppercase: Some(true),
        lines_between_queries: 1,
        ..FormatOptions::default()
    };

    sqlformat::format(sql, &QueryParams::None, &options)
}
