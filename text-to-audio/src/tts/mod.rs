//! TTS backend trait and types.

pub mod azure;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Voice used when nothing else is configured.
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";

/// Neural voices offered for selection, as (label, voice name).
pub const AVAILABLE_VOICES: &[(&str, &str)] = &[
    ("Aria (Female, US)", "en-US-AriaNeural"),
    ("Guy (Male, US)", "en-US-GuyNeural"),
    ("Jenny (Female, US)", "en-US-JennyNeural"),
    ("Davis (Male, US)", "en-US-DavisNeural"),
    ("Emma (Female, US)", "en-US-EmmaNeural"),
];

/// Options for a synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsOptions {
    /// Voice name; `None` uses the backend's default
    pub voice: Option<String>,
    /// Speaking rate multiplier (0.5-2.0, default 1.0)
    pub speech_rate: f32,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            voice: None,
            speech_rate: 1.0,
        }
    }
}

impl TtsOptions {
    /// Create new TTS options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set the speaking rate.
    pub fn with_speech_rate(mut self, rate: f32) -> Self {
        self.speech_rate = rate.clamp(0.5, 2.0);
        self
    }
}

/// TTS backend trait - all speech engines implement this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize `text` into a WAV file at `output_path` and return the
    /// bytes written.
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        options: &TtsOptions,
    ) -> Result<Vec<u8>>;

    /// Backend name for display.
    fn name(&self) -> &str;
}

/// Look up a voice by name or by the first word of its label
/// (case-insensitive), e.g. "guy" or "en-US-GuyNeural".
pub fn find_voice(query: &str) -> Option<&'static str> {
    let query = query.trim();
    AVAILABLE_VOICES.iter().find_map(|(label, name)| {
        let short = label.split_whitespace().next().unwrap_or(label);
        (name.eq_ignore_ascii_case(query) || short.eq_ignore_ascii_case(query)).then_some(*name)
    })
}
