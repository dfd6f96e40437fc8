//! Azure Speech backend using the text-to-speech REST endpoint.
//!
//! Text is wrapped in SSML with the selected neural voice; non-default
//! speaking rates are applied through a `<prosody>` element. The service
//! answers with a complete RIFF/WAV file which is written to the requested
//! path as-is.

use super::{DEFAULT_VOICE, TtsBackend, TtsOptions};
use crate::config::AzureSpeechCredentials;
use crate::error::ConversionError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;

/// 24kHz 16-bit mono PCM in a WAV container.
const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

pub struct AzureSpeechBackend {
    endpoint: String,
    key: String,
    voice: String,
    client: Client,
}

impl AzureSpeechBackend {
    /// Create a backend for the given subscription.
    ///
    /// `voice` becomes the default for calls that don't pick one.
    pub fn new(credentials: &AzureSpeechCredentials, voice: Option<&str>) -> crate::error::Result<Self> {
        if credentials.key.trim().is_empty() || credentials.region.trim().is_empty() {
            return Err(ConversionError::Configuration(
                "Azure Speech needs both a subscription key and a region".into(),
            ));
        }

        Ok(Self {
            endpoint: format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                credentials.region.trim()
            ),
            key: credentials.key.clone(),
            voice: voice.unwrap_or(DEFAULT_VOICE).to_string(),
            client: Client::new(),
        })
    }
}

/// Build the SSML document for one synthesis request.
fn build_ssml(text: &str, voice: &str, speech_rate: f32) -> String {
    let body = escape_xml(text);
    let body = if (speech_rate - 1.0).abs() > f32::EPSILON {
        let percent = (speech_rate * 100.0) as i32;
        format!("<prosody rate=\"{}%\">{}</prosody>", percent, body)
    } else {
        body
    };

    format!(
        "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"en-US\">\
         <voice name=\"{}\">{}</voice></speak>",
        escape_xml(voice),
        body
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl TtsBackend for AzureSpeechBackend {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        options: &TtsOptions,
    ) -> Result<Vec<u8>> {
        let voice = options.voice.as_deref().unwrap_or(&self.voice);
        let ssml = build_ssml(text, voice, options.speech_rate);

        log::debug!(
            "Synthesizing {} chars with {} at rate {}",
            text.chars().count(),
            voice,
            options.speech_rate
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "text-to-audio")
            .body(ssml)
            .send()
            .await
            .context("Speech synthesis request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Speech synthesis failed (HTTP {}): {}", status.as_u16(), detail.trim());
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read synthesized audio")?
            .to_vec();

        if audio.is_empty() {
            anyhow::bail!("Speech service returned no audio");
        }

        tokio::fs::write(output_path, &audio)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        Ok(audio)
    }

    fn name(&self) -> &str {
        "Azure Speech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(key: &str, region: &str) -> AzureSpeechCredentials {
        AzureSpeechCredentials {
            key: key.to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_ssml_default_rate_has_no_prosody() {
        let ssml = build_ssml("Hello there.", "en-US-AriaNeural", 1.0);
        assert!(ssml.contains("<voice name=\"en-US-AriaNeural\">Hello there.</voice>"));
        assert!(!ssml.contains("prosody"));
    }

    #[test]
    fn test_ssml_rate_as_percentage() {
        let ssml = build_ssml("Hi", "en-US-GuyNeural", 1.5);
        assert!(ssml.contains("<prosody rate=\"150%\">Hi</prosody>"));

        let ssml = build_ssml("Hi", "en-US-GuyNeural", 0.75);
        assert!(ssml.contains("rate=\"75%\""));
    }

    #[test]
    fn test_ssml_escapes_markup_in_text() {
        let ssml = build_ssml("Fish & chips <b>now</b>", "en-US-AriaNeural", 1.0);
        assert!(ssml.contains("Fish &amp; chips &lt;b&gt;now&lt;/b&gt;"));
    }

    #[test]
    fn test_backend_endpoint_from_region() {
        let backend = AzureSpeechBackend::new(&credentials("k", "westeurope"), None).unwrap();
        assert_eq!(
            backend.endpoint,
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert_eq!(backend.voice, DEFAULT_VOICE);
    }

    #[test]
    fn test_backend_rejects_blank_credentials() {
        let result = AzureSpeechBackend::new(&credentials("", "eastus"), None);
        assert!(matches!(result, Err(ConversionError::Configuration(_))));
    }

    #[test]
    fn test_default_voice() {
        let backend = AzureSpeechBackend::new(&credentials("k", "eastus"), None).unwrap();
        assert_eq!(backend.voice, DEFAULT_VOICE);

        let backend =
            AzureSpeechBackend::new(&credentials("k", "eastus"), Some("en-US-JennyNeural")).unwrap();
        assert_eq!(backend.voice, "en-US-JennyNeural");
    }
}
