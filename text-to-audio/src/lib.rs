//! text-to-audio - turn PDF, web page, or plain text into narrated WAV files
//!
//! The pipeline: extracted text, optionally rewritten for listening by a
//! language model, is split into overlapping chunks, each chunk is
//! synthesized into its own file inside a timestamped session directory,
//! and the audio plus paths come back in chunk order.

pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod optimize;
pub mod session;
pub mod source;
pub mod text;
pub mod tts;

pub use convert::{ConversionResult, Converter};
pub use error::{ConversionError, Result};
pub use source::{SourceDescriptor, SourceKind};

/// strftime pattern shared by session directories and fallback names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
