//! Error taxonomy for a conversion run.

use std::path::PathBuf;
use thiserror::Error;

use crate::extract::ExtractionError;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{setting} not found for {service}. Set {env_var} environment variable or add to config.")]
    MissingCredential {
        service: &'static str,
        setting: &'static str,
        env_var: &'static str,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Only ever reported as a warning; the run continues with the original text.
    #[error("Text optimization failed, using original text: {source}")]
    Optimization { source: anyhow::Error },

    /// The optimizer could not be built; conversion goes ahead without it.
    #[error("Could not initialize LLM for text optimization: {source:#}")]
    OptimizerUnavailable { source: anyhow::Error },

    #[error("No text to convert")]
    NoText,

    #[error("Failed to create session directory {}: {source}", path.display())]
    SessionDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error converting chunk {chunk} of {total} to audio: {source}")]
    Synthesis {
        /// 1-based position of the failed chunk
        chunk: usize,
        total: usize,
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
