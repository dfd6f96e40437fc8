// Web page text extraction

use super::ExtractionError;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use url::Url;

/// Browser-like agent string; some sites refuse obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 TextToAudio/1.0";

/// Line width handed to html2text; wide enough that paragraphs stay on one line.
const TEXT_WIDTH: usize = 1000;

static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

fn blank_lines() -> &'static Regex {
    BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*\n+").expect("valid pattern"))
}

/// Fetch `address` and return its readable text.
pub async fn extract(client: &Client, address: &str) -> Result<String, ExtractionError> {
    let url = validate_url(address)?;

    log::info!("Fetching {}", url);

    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response.text().await?;
    let text = html_to_text(&html);

    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument("web page"));
    }

    Ok(text)
}

/// Accept only absolute http(s) URLs with a host.
fn validate_url(address: &str) -> Result<Url, ExtractionError> {
    let url = Url::parse(address.trim())
        .map_err(|e| ExtractionError::InvalidUrl(format!("{} ({})", address, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ExtractionError::InvalidUrl(address.to_string()));
    }

    Ok(url)
}

/// Convert HTML to plain text, collapsing runs of blank lines.
fn html_to_text(html: &str) -> String {
    let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH);
    blank_lines().replace_all(text.trim(), "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com/article").is_ok());
        assert!(validate_url("http://example.com").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_missing_scheme_or_host() {
        assert!(matches!(
            validate_url("example.com/article"),
            Err(ExtractionError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("file:///etc/hosts"),
            Err(ExtractionError::InvalidUrl(_))
        ));
        assert!(validate_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_html_to_text_collapses_blank_lines() {
        let html = "<html><body><h1>Title</h1><p>First paragraph.</p>\
                    <p>Second paragraph.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_html_to_text_empty_document() {
        assert_eq!(html_to_text("<html><body></body></html>"), "");
    }
}
