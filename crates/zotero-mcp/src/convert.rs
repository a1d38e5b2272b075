//! Local text extraction for downloaded attachments.
//!
//! PDFs go through `pdf-extract`, HTML snapshots through `htmd`, and plain text is passed
//! through. Extraction is CPU-bound and runs on Tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConversionError;

/// Turns a local file into markdown or plain text.
pub trait DocumentConverter: Send + Sync {
    /// Extract text from the file at `path`. `content_type` is the attachment's MIME type and may
    /// be empty.
    fn convert(&self, path: &Path, content_type: &str) -> Result<String, ConversionError>;
}

/// What kind of document a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF document.
    Pdf,
    /// HTML page or snapshot.
    Html,
    /// Plain text, markdown, CSV and other `text/*`.
    Text,
    /// Anything else.
    Unknown,
}

impl DocumentKind {
    /// Classify by MIME type, falling back to the file extension.
    #[must_use]
    pub fn detect(path: &Path, content_type: &str) -> Self {
        let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => return Self::Pdf,
            "text/html" | "application/xhtml+xml" => return Self::Html,
            m if m.starts_with("text/") => return Self::Text,
            _ => {}
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "html" | "htm" | "xhtml" => Self::Html,
            "txt" | "md" | "markdown" | "csv" | "tex" => Self::Text,
            _ => Self::Unknown,
        }
    }
}

/// Default converter backed by `pdf-extract` and `htmd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    fn html_to_markdown(html: &str) -> Result<String, ConversionError> {
        let converter = htmd::HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style", "head", "noscript"])
            .build();
        converter.convert(html).map_err(ConversionError::from)
    }
}

impl DocumentConverter for MarkdownConverter {
    fn convert(&self, path: &Path, content_type: &str) -> Result<String, ConversionError> {
        let text = match DocumentKind::detect(path, content_type) {
            DocumentKind::Pdf => {
                pdf_extract::extract_text(path).map_err(|e| ConversionError::Pdf(e.to_string()))?
            }
            DocumentKind::Html => {
                let bytes = std::fs::read(path)?;
                Self::html_to_markdown(&String::from_utf8_lossy(&bytes))?
            }
            DocumentKind::Text => {
                let bytes = std::fs::read(path)?;
                String::from_utf8_lossy(&bytes).into_owned()
            }
            DocumentKind::Unknown => {
                let label = if content_type.is_empty() { "unknown" } else { content_type };
                return Err(ConversionError::Unsupported(label.to_string()));
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ConversionError::Empty);
        }
        Ok(trimmed.to_string())
    }
}

/// Run a converter on the blocking pool.
///
/// A panicking converter surfaces as [`ConversionError::Worker`].
pub async fn convert_file(
    converter: Arc<dyn DocumentConverter>,
    path: PathBuf,
    content_type: String,
) -> Result<String, ConversionError> {
    tokio::task::spawn_blocking(move || converter.convert(&path, &content_type))
        .await
        .map_err(|e| ConversionError::Worker(e.to_string()))?
}
