//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on the question inside the prompt.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{QuillError, Result};
use crate::llm::LlmClient;

const QUESTION_MARKER: &str = "- User Question: ";
const QUESTION_END: &str = "\n\n2. Output Requirements";

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Used for unit testing without a running model server.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Whether default responses start with a `<think>` block.
    with_reasoning: bool,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Prompts received so far. Shared with all clones.
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes default responses with a `<think>` block, like reasoning models do.
    pub fn with_reasoning(mut self) -> Self {
        self.with_reasoning = true;
        self
    }

    /// Makes every call fail with an LLM error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds a custom response mapping.
    ///
    /// When the question contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Generates a mock response for a question.
    fn mock_response(&self, question: &str) -> String {
        let input_lower = question.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        let sql = if input_lower.contains("all users") || input_lower.contains("show users") {
            Some("SELECT * FROM users;")
        } else if input_lower.contains("count") && input_lower.contains("orders") {
            Some("SELECT COUNT(*) FROM orders;")
        } else if input_lower.contains("count") && input_lower.contains("users") {
            Some("SELECT COUNT(*) FROM users;")
        } else if input_lower.contains("orders") && input_lower.contains("user") {
            Some("SELECT o.* FROM orders o\nJOIN users u ON o.user_id = u.id;")
        } else if (input_lower.contains("insert") || input_lower.contains("add"))
            && input_lower.contains("user")
        {
            Some("INSERT INTO users (email, name) VALUES ('test@example.com', 'Test User');")
        } else if input_lower.contains("delete") && input_lower.contains("user") {
            Some("DELETE FROM users WHERE id = 1;")
        } else {
            None
        };

        let Some(sql) = sql else {
            return "I don't understand that question. Could you please rephrase it?".to_string();
        };

        let block = format!("```sql\n{sql}\n```");
        if self.with_reasoning {
            format!("<think>\nThe question maps onto the 'users' schema.\n</think>\n\n{block}")
        } else {
            block
        }
    }
}

/// Returns the user question embedded in a prompt, or the whole prompt.
fn question_of(prompt: &str) -> &str {
    let Some(start) = prompt.find(QUESTION_MARKER) else {
        return prompt;
    };
    let rest = &prompt[start + QUESTION_MARKER.len()..];
    rest.find(QUESTION_END).map_or(rest, |end| &rest[..end])
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(QuillError::llm(message.clone()));
        }

        Ok(self.mock_response(question_of(prompt)))
    }
}
