//! LLM provider implementations

mod azure_openai;
pub mod mock;
mod openai_compatible;

pub use azure_openai::AzureOpenAIProvider;
pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// API version sent to Azure OpenAI when none is configured
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    AzureOpenAI,
    OpenAI,
    OpenRouter,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "azure-openai" | "azure_openai" | "azure" => Ok(Self::AzureOpenAI),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::AzureOpenAI => "AZURE_OPENAI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind = ProviderKind::from_str(&preset.provider)?;
    let api_key = resolve_setting(
        provider_config.and_then(|c| c.api_key.clone()),
        kind.env_var(),
        &preset.provider,
        "API key",
    )?;

    match kind {
        ProviderKind::AzureOpenAI => {
            let endpoint = resolve_setting(
                provider_config.and_then(|c| c.base_url.clone()),
                "AZURE_OPENAI_ENDPOINT",
                &preset.provider,
                "Endpoint",
            )?;
            let deployment = if preset.model.is_empty() {
                resolve_setting(
                    None,
                    "AZURE_OPENAI_DEPLOYMENT_NAME",
                    &preset.provider,
                    "Deployment",
                )?
            } else {
                preset.model.clone()
            };
            let api_version = provider_config
                .and_then(|c| c.api_version.clone())
                .or_else(|| std::env::var("AZURE_OPENAI_API_VERSION").ok())
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string());

            Ok(Box::new(AzureOpenAIProvider::new(
                &endpoint,
                &deployment,
                &api_version,
                api_key,
            )?))
        }
        ProviderKind::OpenAI => {
            let provider = match provider_config.and_then(|c| c.base_url.as_deref()) {
                Some(base_url) => {
                    OpenAICompatibleProvider::new(&preset.model, base_url, api_key, "OpenAI")?
                }
                None => OpenAICompatibleProvider::openai(&preset.model, api_key)?,
            };
            Ok(Box::new(provider))
        }
        ProviderKind::OpenRouter => Ok(Box::new(OpenAICompatibleProvider::openrouter(
            &preset.model,
            api_key,
        )?)),
    }
}

/// Resolve a provider setting from config, then the environment
fn resolve_setting(
    configured: Option<String>,
    env_var: &str,
    provider: &str,
    setting: &str,
) -> Result<String> {
    resolve_setting_with(configured, |name| std::env::var(name).ok(), env_var, provider, setting)
}

/// Blank values on either side count as unset.
fn resolve_setting_with<F>(
    configured: Option<String>,
    lookup: F,
    env_var: &str,
    provider: &str,
    setting: &str,
) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |v: &String| !v.trim().is_empty();
    configured
        .filter(present)
        .or_else(|| lookup(env_var).filter(present))
        .ok_or_else(|| LlmError::MissingSetting {
            provider: provider.to_string(),
            setting: setting.to_string(),
            env_var: env_var.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(
            ProviderKind::from_str("azure-openai").unwrap(),
            ProviderKind::AzureOpenAI
        );
        assert_eq!(ProviderKind::from_str("Azure").unwrap(), ProviderKind::AzureOpenAI);
        assert_eq!(ProviderKind::from_str("openrouter").unwrap(), ProviderKind::OpenRouter);
        assert!(ProviderKind::from_str("bogus").is_err());
    }

    #[test]
    fn test_config_key_wins_over_environment() {
        let config = ProviderConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        let key = resolve_setting(
            config.api_key.clone(),
            "TTA_TEST_UNSET_KEY_VAR",
            "openai",
            "API key",
        )
        .unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_blank_config_key_falls_back_to_environment() {
        let lookup = |name: &str| (name == "OPENAI_API_KEY").then(|| "from-env".to_string());
        let key =
            resolve_setting_with(Some("  ".to_string()), lookup, "OPENAI_API_KEY", "openai", "API key")
                .unwrap();
        assert_eq!(key, "from-env");

        let err = resolve_setting_with(
            Some(String::new()),
            |_: &str| Some(" ".to_string()),
            "OPENAI_API_KEY",
            "openai",
            "API key",
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::MissingSetting { .. }));
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let err =
            resolve_setting(None, "TTA_TEST_UNSET_KEY_VAR", "openai", "API key").unwrap_err();
        assert_eq!(
            err.to_string(),
            "API key not configured for openai. Set TTA_TEST_UNSET_KEY_VAR environment variable or add to config."
        );
    }

    #[test]
    fn test_azure_provider_from_explicit_config() {
        let preset = ModelPreset {
            provider: "azure-openai".to_string(),
            model: "narrator".to_string(),
        };
        let config = ProviderConfig {
            api_key: Some("secret".to_string()),
            base_url: Some("https://example.openai.azure.com/".to_string()),
            api_version: Some("2024-06-01".to_string()),
        };
        let provider = get_provider(&preset, Some(&config)).unwrap();
        assert_eq!(provider.name(), "Azure OpenAI");
    }
}
