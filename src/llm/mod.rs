//! LLM integration for sqlquill.
//!
//! Provides the client trait the orchestrator talks to, the Ollama and mock
//! implementations, and the prompt/response handling around them.

pub mod factory;
pub mod mock;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod reasoning;

pub use factory::create_client;
pub use mock::MockLlmClient;
pub use ollama::{OllamaClient, OllamaConfig};
pub use parser::{
    extract_reasoning, extract_sql, parse_response, ParsedResponse, SqlExtractor, NO_SQL_SENTINEL,
};
pub use prompt::{build_prompt, render_template};
pub use reasoning::format_reasoning;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for a single prompt.
    ///
    /// Returns the complete response as a single string.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local Ollama instance
    #[default]
    Ollama,
    /// Mock client for testing (no model server required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
