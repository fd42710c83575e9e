//! Display formatting for model reasoning.

use regex::Regex;
use std::sync::LazyLock;

/// Ordered markdown normalizations. Bold runs before quote-to-code.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\*\*(.*?)\*\*", "**${1}**"),
        (r"'([a-zA-Z0-9_]+)'", "`${1}`"),
        (r"__(.*?)__", "_${1}_"),
        (r"~~(.*?)~~", "~~${1}~~"),
        (r"==(.*?)==", "<mark>${1}</mark>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("reasoning pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Formats raw reasoning text for display as markdown.
///
/// The text is HTML-escaped first, so the only tags in the output are the
/// `<mark>` pairs produced by the highlight rule.
pub fn format_reasoning(reasoning: &str) -> String {
    let mut formatted = escape_html(reasoning);
    for (pattern, replacement) in SUBSTITUTIONS.iter() {
        formatted = pattern.replace_all(&formatted, *replacement).into_owned();
    }
    formatted
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
