//! text-to-audio configuration management.
//!
//! Settings live in `~/.config/cli-programs/text-to-audio.toml`. Credentials
//! may be stored there or supplied through the environment; either way they
//! are resolved once, up front, into explicit values handed to the backends.

use crate::error::{ConversionError, Result};
use crate::text::DEFAULT_MAX_LENGTH;
use crate::tts::DEFAULT_VOICE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_SPEECH_RATE: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory for session folders
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Neural voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate multiplier (0.5-2.0)
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,

    /// Maximum characters per synthesized chunk
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Rewrite text for listening before synthesis
    #[serde(default = "default_optimize")]
    pub optimize: bool,

    /// Extra instructions appended to the optimization prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,

    /// LLM preset for optimization (see llm.toml); program default if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_preset: Option<String>,

    #[serde(default)]
    pub azure_speech: AzureSpeechSettings,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("audio_output")
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speech_rate() -> f32 {
    DEFAULT_SPEECH_RATE
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_optimize() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            voice: default_voice(),
            speech_rate: default_speech_rate(),
            max_chunk_length: default_max_chunk_length(),
            optimize: default_optimize(),
            custom_instructions: None,
            llm_preset: None,
            azure_speech: AzureSpeechSettings::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path: ~/.config/cli-programs/text-to-audio.toml
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .map(|home| home.join(".config"))
            .ok_or_else(|| ConversionError::Configuration("Could not determine home directory".into()))?;
        Ok(config_dir.join("cli-programs").join("text-to-audio.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Azure Speech subscription settings as stored in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureSpeechSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Resolved, non-empty Azure Speech credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSpeechCredentials {
    pub key: String,
    pub region: String,
}

impl AzureSpeechSettings {
    /// Resolve credentials from the config file, then the process
    /// environment (`AZURE_SPEECH_KEY`, `AZURE_SPEECH_REGION`).
    pub fn resolve(&self) -> Result<AzureSpeechCredentials> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` in place of the environment.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<AzureSpeechCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |configured: &Option<String>, env_var: &'static str, setting: &'static str| {
            let present = |v: &String| !v.trim().is_empty();
            configured
                .clone()
                .filter(present)
                .or_else(|| lookup(env_var).filter(present))
                .ok_or(ConversionError::MissingCredential {
                    service: "Azure Speech",
                    setting,
                    env_var,
                })
        };

        Ok(AzureSpeechCredentials {
            key: pick(&self.key, "AZURE_SPEECH_KEY", "Subscription key")?,
            region: pick(&self.region, "AZURE_SPEECH_REGION", "Region")?,
        })
    }
}
