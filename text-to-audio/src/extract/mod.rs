//! Getting text out of PDFs and web pages.

mod pdf;
mod web;

pub use web::USER_AGENT;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),

    #[error("Error extracting text from URL: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error extracting text from URL: HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("No text could be extracted from the {0}")]
    EmptyDocument(&'static str),
}

/// Source of raw text for a conversion.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the text of a PDF held in memory.
    async fn extract_from_pdf(&self, bytes: Vec<u8>) -> Result<String, ExtractionError>;

    /// Fetch a web page and extract its readable text.
    async fn extract_from_url(&self, url: &str) -> Result<String, ExtractionError>;
}

/// Extractor backed by `pdf-extract` and an HTTP client.
pub struct Extractor {
    client: Client,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractionError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentExtractor for Extractor {
    async fn extract_from_pdf(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        pdf::extract(bytes).await
    }

    async fn extract_from_url(&self, url: &str) -> Result<String, ExtractionError> {
        web::extract(&self.client, url).await
    }
}
