//! OpenAI-compatible API provider
//!
//! Used for providers that implement the OpenAI chat completions API:
//! - OpenAI
//! - OpenRouter
//!
//! The wire types and response handling here are shared with the Azure
//! OpenAI provider, which speaks the same payload format.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

/// Provider for OpenAI-compatible APIs
pub struct OpenAICompatibleProvider {
    model: String,
    base_url: String,
    api_key: String,
    name: &'static str,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Create a new OpenAI-compatible provider
    pub fn new(model: &str, base_url: &str, api_key: String, name: &'static str) -> Result<Self> {
        if model.is_empty() {
            return Err(LlmError::ConfigError(format!(
                "{} preset needs a model name",
                name
            )));
        }

        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            name,
            client: Client::new(),
        })
    }

    /// Create a provider for the public OpenAI API
    pub fn openai(model: &str, api_key: String) -> Result<Self> {
        Self::new(model, "https://api.openai.com/v1", api_key, "OpenAI")
    }

    /// Create an OpenRouter provider
    pub fn openrouter(model: &str, api_key: String) -> Result<Self> {
        Self::new(model, "https://openrouter.ai/api/v1", api_key, "OpenRouter")
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// System message first (if any), then the user prompt
    pub fn from_request(model: Option<String>, request: &LlmRequest) -> Self {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &request.system_prompt {
            messages.push(Message {
                role: "system",
                content: system.clone(),
            });
        }

        messages.push(Message {
            role: "user",
            content: request.prompt.clone(),
        });

        Self {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct Message {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Turn an HTTP response into an `LlmResponse`, mapping error statuses
pub(super) async fn read_chat_response(response: Response, model: &str) -> Result<LlmResponse> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let error_text = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited { retry_after });
        }

        let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(error_response) => error_response.error.message,
            Err(_) => error_text,
        };

        return Err(LlmError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        });
    }

    let chat_response: ChatCompletionResponse =
        response.json().await.map_err(|e| LlmError::ApiError {
            message: format!("Failed to parse response: {}", e),
            status_code: None,
        })?;

    let content = chat_response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .ok_or(LlmError::EmptyResponse)?;

    let usage = chat_response.usage.map(|u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    Ok(LlmResponse {
        content,
        model: model.to_string(),
        usage,
    })
}

#[async_trait]
impl LlmProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let chat_request = ChatCompletionRequest::from_request(Some(self.model.clone()), &request);
        let url = format!("{}/chat/completions", self.base_url);

        log::debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        read_chat_response(response, &self.model).await
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_includes_system_first() {
        let request = LlmRequest::new("hello")
            .with_system_prompt("narrate")
            .with_temperature(0.3);
        let chat = ChatCompletionRequest::from_request(Some("gpt-4o".to_string()), &request);
        let json = serde_json::to_value(&chat).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "narrate");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_request_without_model_omits_field() {
        let chat = ChatCompletionRequest::from_request(None, &LlmRequest::new("hi"));
        let json = serde_json::to_value(&chat).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_model_rejected() {
        assert!(OpenAICompatibleProvider::openrouter("", "key".to_string()).is_err());
    }
}
