//! Mock LLM provider for testing
//!
//! Returns a canned response or a canned failure, and records the requests
//! it receives so callers can assert on prompt construction.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

enum Behavior {
    Respond(String),
    Fail { message: String, status_code: Option<u16> },
}

/// A mock provider for exercising callers without network access
pub struct MockProvider {
    behavior: Behavior,
    call_count: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Create a provider that always answers with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self::with_behavior(Behavior::Respond(response.to_string()))
    }

    /// Create a provider that always fails with an API error
    pub fn always_fails(message: &str, status_code: Option<u16>) -> Self {
        Self::with_behavior(Behavior::Fail {
            message: message.to_string(),
            status_code,
        })
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request received, if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.last().cloned())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match &self.behavior {
            Behavior::Respond(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "mock-model".to_string(),
                usage: None,
            }),
            Behavior::Fail {
                message,
                status_code,
            } => Err(LlmError::ApiError {
                message: message.clone(),
                status_code: *status_code,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");

        let result = provider.complete(LlmRequest::new("test")).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails("overloaded", Some(503));

        for _ in 0..3 {
            let err = provider.complete(LlmRequest::new("test")).await.unwrap_err();
            assert!(err.to_string().contains("HTTP 503"));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_last_request() {
        let provider = MockProvider::always_succeeds("ok");
        assert!(provider.last_request().is_none());

        provider
            .complete(LlmRequest::new("first"))
            .await
            .unwrap();
        provider
            .complete(LlmRequest::new("second").with_system_prompt("sys"))
            .await
            .unwrap();

        let last = provider.last_request().unwrap();
        assert_eq!(last.prompt, "second");
        assert_eq!(last.system_prompt.as_deref(), Some("sys"));
    }
}
