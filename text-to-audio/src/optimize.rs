//! Rewriting text so it reads naturally aloud.

use anyhow::{Context, Result};
use async_trait::async_trait;
use llm_client::{Config, LlmProvider, LlmRequest, get_provider};

/// Program name used to look up the default LLM preset.
pub const PROGRAM_NAME: &str = "text-to-audio";

const NARRATION_PROMPT: &str = "You are an expert at preparing text for audio narration. \
Optimize the following text for listening as a learning material. \
Do not change the meaning or content, but make small adjustments so it sounds natural and clear when read aloud. \
Keep all information, but improve flow, add brief pauses where needed, and clarify any awkward phrasing. \
Return only the improved text. Avoid using any markdown or formatting tags.";

/// Low temperature keeps the rewrite close to the source.
const TEMPERATURE: f32 = 0.3;

/// Optional pre-synthesis rewrite of the whole text.
///
/// Failures are never fatal to a conversion; the caller falls back to the
/// original text.
#[async_trait]
pub trait TextOptimizer: Send + Sync {
    async fn optimize(&self, text: &str) -> Result<String>;
}

/// Optimizer backed by a chat-completion provider.
pub struct LlmOptimizer {
    provider: Box<dyn LlmProvider>,
    system_prompt: String,
}

impl LlmOptimizer {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self {
            provider,
            system_prompt: NARRATION_PROMPT.to_string(),
        }
    }

    /// Build from the shared LLM configuration.
    ///
    /// If `preset_name` is None, uses the program default from config.
    pub fn from_config(preset_name: Option<&str>) -> Result<Self> {
        let config = Config::load().context("Failed to load LLM configuration")?;
        Self::from_llm_config(&config, preset_name)
    }

    /// Build from an already loaded LLM configuration.
    pub fn from_llm_config(config: &Config, preset_name: Option<&str>) -> Result<Self> {
        let (preset_name, preset) = config
            .resolve_preset(preset_name, PROGRAM_NAME)
            .context("Failed to select LLM preset")?;

        let provider_config = config.get_provider_config(&preset.provider);
        let provider = get_provider(preset, provider_config).with_context(|| {
            format!(
                "Failed to initialize provider '{}' for preset '{}'",
                preset.provider, preset_name
            )
        })?;

        log::debug!("Using LLM provider: {}", provider.name());

        Ok(Self::new(provider))
    }

    /// Append caller-supplied guidance to the narration prompt.
    pub fn with_instructions(mut self, instructions: &str) -> Self {
        let instructions = instructions.trim();
        if !instructions.is_empty() {
            self.system_prompt.push(' ');
            self.system_prompt.push_str(instructions);
        }
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl TextOptimizer for LlmOptimizer {
    async fn optimize(&self, text: &str) -> Result<String> {
        let request = LlmRequest::new(text)
            .with_system_prompt(self.system_prompt.clone())
            .with_temperature(TEMPERATURE);

        let response = self
            .provider
            .complete(request)
            .await
            .with_context(|| format!("{} request failed", self.provider.name()))?;

        if let Some(usage) = &response.usage {
            log::debug!(
                "Tokens: {} in, {} out",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        let optimized = response.content.trim();
        if optimized.is_empty() {
            anyhow::bail!("{} returned empty text", self.provider.name());
        }

        Ok(optimized.to_string())
    }
}
