//! Azure OpenAI provider
//!
//! Chat completions are addressed by deployment rather than model name and
//! authenticated with an `api-key` header.

use async_trait::async_trait;
use reqwest::Client;

use super::openai_compatible::{ChatCompletionRequest, read_chat_response};
use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// Provider for an Azure OpenAI deployment
pub struct AzureOpenAIProvider {
    url: String,
    deployment: String,
    api_key: String,
    client: Client,
}

impl AzureOpenAIProvider {
    /// Create a provider for `deployment` on `endpoint`
    pub fn new(endpoint: &str, deployment: &str, api_version: &str, api_key: String) -> Result<Self> {
        if endpoint.trim().is_empty() || deployment.trim().is_empty() {
            return Err(LlmError::ConfigError(
                "Azure OpenAI needs both an endpoint and a deployment".into(),
            ));
        }

        Ok(Self {
            url: completions_url(endpoint, deployment, api_version),
            deployment: deployment.to_string(),
            api_key,
            client: Client::new(),
        })
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

#[async_trait]
impl LlmProvider for AzureOpenAIProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let chat_request = ChatCompletionRequest::from_request(None, &request);

        log::debug!("POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        read_chat_response(response, &self.deployment).await
    }

    fn name(&self) -> &'static str {
        "Azure OpenAI"
    }
}
