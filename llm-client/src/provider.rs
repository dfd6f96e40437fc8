use async_trait::async_trait;

use crate::error::Result;

/// A single-turn chat request: system instructions plus one user message
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Build a request carrying `prompt` as the user message
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a completion request
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("some text")
            .with_system_prompt("be brief")
            .with_temperature(0.3)
            .with_max_tokens(512);

        assert_eq!(request.prompt, "some text");
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(512));
    }
}
