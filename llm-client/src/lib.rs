//! Chat-completion client library for text-to-audio
//!
//! Provides a unified interface over the providers used to rewrite text
//! before narration:
//! - Azure OpenAI (deployment-scoped chat completions)
//! - OpenAI-compatible APIs (OpenAI, OpenRouter)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, ProviderKind, get_provider};
