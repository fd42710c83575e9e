//! Prompt construction for LLM requests.
//!
//! Fills a fixed template with the database type, the rendered schema and the
//! user's question.

/// Prompt template with `{db_type}`, `{schema}` and `{query}` slots.
pub const TEMPLATE: &str = r#"
You are a SQL generator. Your task is to generate valid and optimized SQL queries based on the provided database type, schema, and user questions.

1. Input Information:
- Database Type: {db_type}
- Schema: 
{schema}
- User Question: {query}

2. Output Requirements:
- Only return SQL queries wrapped in triple backticks with the `sql` language tag, like this:
```sql
SELECT * FROM table_name;
SELECT * FROM table2_name;
```
- Ensure the SQL queries strictly adhere to the provided schema. Do not use any table or column names not listed in the schema.
- If the user question is ambiguous, make reasonable assumptions based on the schema and generate the most likely query.
- Optimize the queries for performance where possible.
- Do not include any explanation, comments, or additional text outside the SQL block.

3. Notes:
- The user may ask multiple questions in a single input. Provide separate queries for each question.
- Use the schema to validate table and column names and ensure correctness.
"#;

/// Builds the prompt for a question against a database.
pub fn build_prompt(db_type: &str, schema_text: &str, question: &str) -> String {
    render_template(
        TEMPLATE,
        &[("db_type", db_type), ("schema", schema_text), ("query", question)],
    )
}

/// Substitutes `{name}` slots in `template` in a single left-to-right pass.
///
/// Inserted values are copied verbatim and never re-scanned, so a question
/// that contains `{schema}` stays literal. Braces that do not name a known
/// slot are kept as-is.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let slot = after_open.find('}').and_then(|close| {
            let name = &after_open[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match slot {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_fills_all_slots() {
        let prompt = build_prompt("postgresql", "Table: users\n  - id (integer)\n", "How many users?");

        assert!(prompt.contains("- Database Type: postgresql\n"));
        assert!(prompt.contains("- Schema: \nTable: users\n  - id (integer)\n"));
        assert!(prompt.contains("- User Question: How many users?\n"));
        assert!(!prompt.contains("{db_type}"));
        assert!(!prompt.contains("{schema}"));
        assert!(!prompt.contains("{query}"));
    }

    #[test]
    fn test_prompt_keeps_instructions() {
        let prompt = build_prompt("sqlite", "", "q");
        assert!(prompt.contains("```sql\nSELECT * FROM table_name;"));
        assert!(prompt.contains("Do not use any table or column names not listed in the schema."));
        assert!(prompt.contains("Provide separate queries for each question."));
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        let prompt = build_prompt("sqlite", "Table: t\n", "what is {schema} and {db_type}?");
        assert!(prompt.contains("- User Question: what is {schema} and {db_type}?"));
        assert_eq!(prompt.matches("Table: t").count(), 1);
    }

    #[test]
    fn test_render_template_keeps_unknown_braces() {
        let rendered = render_template("a {x} {unknown} {", &[("x", "1")]);
        assert_eq!(rendered, "a 1 {unknown} {");
    }

    #[test]
    fn test_render_template_unicode() {
        let rendered = render_template("é{x}ü", &[("x", "ß")]);
        assert_eq!(rendered, "éßü");
    }
}
