//! Statement splitting.
//!
//! Divides SQL text into individually executable statements on top-level
//! semicolons. Semicolons inside quoted text, dollar-quoted bodies and
//! comments do not end a statement.

use std::iter::Peekable;
use std::str::CharIndices;

/// Splits `sql` into trimmed statements, each keeping its terminating `;`.
///
/// Empty statements (stray semicolons, trailing whitespace) are dropped. An
/// unterminated quote or comment simply runs to the end of the text.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut chars = sql.char_indices().peekable();
    let mut start = 0;

    while let Some((idx, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => skip_quoted(&mut chars, c),
            '-' if next_is(&mut chars, '-') => skip_line_comment(&mut chars),
            '/' if next_is(&mut chars, '*') => {
                chars.next();
                skip_block_comment(&mut chars);
            }
            '$' => skip_dollar_quoted(sql, idx, &mut chars),
            ';' => {
                push_statement(&mut statements, &sql[start..idx + 1]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    push_statement(&mut statements, &sql[start..]);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.trim_end_matches(';').trim().is_empty() {
        return;
    }
    statements.push(trimmed.to_string());
}

fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    matches!(chars.peek(), Some(&(_, c)) if c == expected)
}

/// Skips to the closing `quote`. A doubled quote is an escaped quote and
/// does not close the literal.
fn skip_quoted(chars: &mut Peekable<CharIndices<'_>>, quote: char) {
    while let Some((_, c)) = chars.next() {
        if c == quote {
            if next_is(chars, quote) {
                chars.next();
                continue;
            }
            return;
        }
    }
}

fn skip_line_comment(chars: &mut Peekable<CharIndices<'_>>) {
    for (_, c) in chars.by_ref() {
        if c == '\n' {
            return;
        }
    }
}

fn skip_block_comment(chars: &mut Peekable<CharIndices<'_>>) {
    while let Some((_, c)) = chars.next() {
        if c == '*' && next_is(chars, '/') {
            chars.next();
            return;
        }
    }
}

/// Skips a PostgreSQL dollar-quoted body (`$$…$$` or `$tag$…$tag$`).
///
/// `$1`-style parameters and lone dollars are left alone.
fn skip_dollar_quoted(sql: &str, dollar_idx: usize, chars: &mut Peekable<CharIndices<'_>>) {
    let rest = &sql[dollar_idx + 1..];
    let Some(tag_len) = rest.find('$') else {
        return;
    };
    let tag = &rest[..tag_len];
    let tag_is_valid = tag
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c.is_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if !tag_is_valid {
        return;
    }

    let delimiter = format!("${tag}$");
    let body_start = dollar_idx + delimiter.len();
    let end = sql[body_start..]
        .find(&delimiter)
        .map_or(sql.len(), |offset| body_start + offset + delimiter.len());

    while matches!(chars.peek(), Some(&(i, _)) if i < end) {
        chars.next();
    }
}
