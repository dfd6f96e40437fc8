// PDF text extraction

use super::ExtractionError;

/// Extract all page text from an in-memory PDF.
///
/// Parsing runs on the blocking pool; a panic inside the parser is reported
/// as an extraction error rather than taking the process down.
pub async fn extract(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Pdf("file is empty".into()));
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractionError::Pdf(format!("parser stopped unexpectedly: {}", e)))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument("PDF"));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_bytes_rejected() {
        let err = extract(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_garbage_is_an_extraction_error() {
        let err = extract(b"definitely not a pdf".to_vec()).await.unwrap_err();
        assert!(err.to_string().starts_with("Error extracting text from PDF"));
    }
}
