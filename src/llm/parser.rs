//! Response parsing for LLM outputs.
//!
//! Pulls the model's reasoning out of `<think>` blocks and the SQL out of the
//! reply. SQL extraction runs an ordered chain of extractors; the first that
//! matches wins, and a reply with no SQL at all yields [`NO_SQL_SENTINEL`].

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::llm::reasoning::format_reasoning;

/// Placeholder returned when no SQL could be found in a reply.
pub const NO_SQL_SENTINEL: &str = "-- SQL code could not be created.";

static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("think pattern is valid"));

static FENCED_SQL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```sql(.*?)```").expect("fence pattern is valid"));

static SQL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER).*")
        .expect("keyword pattern is valid")
});

/// Result of parsing an LLM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Raw `<think>` contents, joined with newlines.
    pub reasoning: Option<String>,
    /// Reasoning after markdown normalization, ready for display.
    pub formatted_reasoning: Option<String>,
    /// Extracted SQL, or [`NO_SQL_SENTINEL`].
    pub sql: String,
}

impl ParsedResponse {
    /// Returns true if no SQL was found.
    pub fn is_sentinel(&self) -> bool {
        self.sql == NO_SQL_SENTINEL
    }
}

/// Parses a raw model reply.
pub fn parse_response(response: &str) -> ParsedResponse {
    let reasoning = extract_reasoning(response);
    let formatted_reasoning = reasoning.as_deref().map(format_reasoning);

    ParsedResponse {
        reasoning,
        formatted_reasoning,
        sql: extract_sql(response),
    }
}

/// Collects every `<think>…</think>` region in order, joined with `\n`.
pub fn extract_reasoning(response: &str) -> Option<String> {
    let parts: Vec<&str> = THINK_RE
        .captures_iter(response)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    (!parts.is_empty()).then(|| parts.join("\n"))
}

/// A single strategy for locating SQL in a reply.
pub trait SqlExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the SQL this strategy finds, if any.
    fn extract(&self, text: &str) -> Option<String>;
}

/// Contents of the first ```` ```sql ```` fenced block.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedBlockExtractor;

impl SqlExtractor for FencedBlockExtractor {
    fn name(&self) -> &'static str {
        "fenced-block"
    }

    fn extract(&self, text: &str) -> Option<String> {
        FENCED_SQL_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|sql| !sql.is_empty())
            .map(str::to_string)
    }
}

/// Everything from the first SQL keyword to the end of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl SqlExtractor for KeywordExtractor {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn extract(&self, text: &str) -> Option<String> {
        SQL_KEYWORD_RE
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    }
}

static DEFAULT_EXTRACTORS: &[&dyn SqlExtractor] = &[&FencedBlockExtractor, &KeywordExtractor];

/// Runs `extractors` in order and returns the first hit, or the sentinel.
pub fn extract_sql_with(text: &str, extractors: &[&dyn SqlExtractor]) -> String {
    extractors
        .iter()
        .find_map(|extractor| {
            let sql = extractor.extract(text)?;
            debug!("SQL found by {} extractor", extractor.name());
            Some(sql)
        })
        .unwrap_or_else(|| NO_SQL_SENTINEL.to_string())
}

/// Extracts SQL using the fenced-block then keyword strategies.
pub fn extract_sql(text: &str) -> String {
    extract_sql_with(text, DEFAULT_EXTRACTORS)
}
