use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};

/// Preset name used when nothing else is configured
pub const DEFAULT_PRESET: &str = "azure-openai";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset used when no program-specific default exists
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Per-program default presets (program name -> preset name)
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Named model presets
    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider-specific settings, keyed by provider identifier
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

/// A named model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (azure-openai, openai, openrouter)
    pub provider: String,

    /// Model name for the provider. For Azure OpenAI this is the deployment
    /// name; leave it empty to read `AZURE_OPENAI_DEPLOYMENT_NAME`.
    #[serde(default)]
    pub model: String,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Endpoint or base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API version query parameter (Azure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl Config {
    /// Load `~/.config/cli-programs/llm.toml`, or defaults if it is absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Write to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| LlmError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/cli-programs/llm.toml"))
    }

    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// Preset name for `program`, falling back to `default_preset`
    pub fn get_default_for_program(&self, program: &str) -> &str {
        self.defaults
            .get(program)
            .map(String::as_str)
            .unwrap_or(&self.default_preset)
    }

    /// Pick the preset a program should use: an explicit request wins,
    /// otherwise the program default. Returns the resolved name with it.
    pub fn resolve_preset<'a>(
        &'a self,
        requested: Option<&'a str>,
        program: &str,
    ) -> Result<(&'a str, &'a ModelPreset)> {
        let name = requested.unwrap_or_else(|| self.get_default_for_program(program));
        Ok((name, self.get_preset(name)?))
    }

    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut presets = HashMap::new();

        // Deployment comes from the environment unless a preset names one
        presets.insert(
            DEFAULT_PRESET.to_string(),
            ModelPreset {
                provider: "azure-openai".to_string(),
                model: String::new(),
            },
        );

        Self {
            default_preset: default_preset(),
            defaults: HashMap::new(),
            presets,
            providers: HashMap::new(),
        }
    }
}
