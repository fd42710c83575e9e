//! Statement kind detection.
//!
//! Uses sqlparser-rs to decide whether a statement produces a row set or an
//! affected-row count, so drivers know whether to fetch rows or just execute.

use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, GenericDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use crate::db::DatabaseBackend;

/// Keywords that start a row-returning statement when parsing fails.
const ROW_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "VALUES", "TABLE", "SHOW", "EXPLAIN", "PRAGMA", "DESCRIBE",
];

/// What executing a statement yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows (queries, EXPLAIN, SHOW, PRAGMA, DML with RETURNING).
    Rows,
    /// Modifies data or schema; reports an affected-row count.
    Mutation,
}

/// Classifies a single statement for the given backend.
pub fn classify_statement(sql: &str, backend: Option<DatabaseBackend>) -> StatementKind {
    let dialect: Box<dyn Dialect> = match backend {
        Some(DatabaseBackend::Postgres) => Box::new(PostgreSqlDialect {}),
        Some(DatabaseBackend::Sqlite) => Box::new(SQLiteDialect {}),
        None => Box::new(GenericDialect {}),
    };

    match Parser::parse_sql(dialect.as_ref(), sql) {
        Ok(statements) if !statements.is_empty() => {
            // A split statement holds one entry; judge by the last one regardless
            statements
                .last()
                .map_or(StatementKind::Mutation, kind_of_statement)
        }
        _ => classify_by_keyword(sql),
    }
}

fn kind_of_statement(statement: &Statement) -> StatementKind {
    let returns_rows = match statement {
        Statement::Query(_)
        | Statement::Explain { .. }
        | Statement::ExplainTable { .. }
        | Statement::Pragma { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. } => true,
        Statement::Insert(insert) => insert.returning.is_some(),
        Statement::Update { returning, .. } => returning.is_some(),
        Statement::Delete(delete) => delete.returning.is_some(),
        _ => false,
    };

    if returns_rows {
        StatementKind::Rows
    } else {
        StatementKind::Mutation
    }
}

/// Fallback for text sqlparser rejects: look at the first keyword, skipping
/// leading comments and parentheses, and at any RETURNING clause.
fn classify_by_keyword(sql: &str) -> StatementKind {
    let upper = strip_leading_comments(sql).to_uppercase();
    let first_word = upper
        .trim_start_matches(|c: char| c == '(' || c.is_whitespace())
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or("");

    let has_returning = upper
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|word| word == "RETURNING");

    if ROW_KEYWORDS.contains(&first_word) || has_returning {
        StatementKind::Rows
    } else {
        StatementKind::Mutation
    }
}

fn strip_leading_comments(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail).trim_start();
        } else {
            return rest;
        }
    }
}

/// Returns true if the statement holds nothing but comments and whitespace.
pub fn is_comment_only(sql: &str) -> bool {
    strip_leading_comments(sql).trim_end_matches(';').trim().is_empty()
}
