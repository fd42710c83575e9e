//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OllamaClient, OllamaConfig};

/// Creates an LLM client from resolved settings.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Ollama => {
            let ollama = OllamaConfig::new(config.model.clone())
                .with_url(config.url.clone())
                .with_timeout(config.timeout_secs);
            Ok(Box::new(OllamaClient::new(ollama)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new().with_reasoning())),
    }
}
