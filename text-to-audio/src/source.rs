//! Where the text being converted came from.

use std::fmt;

/// Kind of source the text was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Url,
    Text,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Url => "url",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Identifies the source of a conversion request.
///
/// `name` is the uploaded file name for PDFs, the address for URLs, and
/// usually empty for direct text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    pub kind: SourceKind,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn pdf(file_name: impl Into<String>) -> Self {
        Self::new(file_name, SourceKind::Pdf)
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(url, SourceKind::Url)
    }

    /// Direct text input with no identifier.
    pub fn text() -> Self {
        Self::new(String::new(), SourceKind::Text)
    }
}
