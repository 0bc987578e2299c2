pub mod pdftotext;

use crate::error::KteError;
use crate::normalize::TextFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract the text of the whole document, pages separated by blank lines.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, KteError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Input file type, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Markdown,
    Plain,
    Html,
    Pdf,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, KteError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" => Ok(DocumentFormat::Markdown),
            "txt" | "text" => Ok(DocumentFormat::Plain),
            "html" | "htm" => Ok(DocumentFormat::Html),
            "pdf" => Ok(DocumentFormat::Pdf),
            "" => Err(KteError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(KteError::UnsupportedFormat(format!(
                ".{other} (supported: .md, .markdown, .txt, .text, .html, .htm, .pdf)"
            ))),
        }
    }

    /// Normalizer hint for text decoded from this format. PDF text carries
    /// no markup, so header detection falls back to the plain heuristics.
    pub fn text_format(self) -> TextFormat {
        match self {
            DocumentFormat::Markdown => TextFormat::Markdown,
            DocumentFormat::Plain | DocumentFormat::Pdf => TextFormat::Plain,
            DocumentFormat::Html => TextFormat::Html,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Markdown => write!(f, "markdown"),
            DocumentFormat::Plain => write!(f, "plain"),
            DocumentFormat::Html => write!(f, "html"),
            DocumentFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// Decoded document text with its format.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub format: DocumentFormat,
}

impl Document {
    pub fn text_format(&self) -> TextFormat {
        self.format.text_format()
    }
}

/// Decode raw file bytes of a known format.
pub fn decode_bytes(
    bytes: &[u8],
    format: DocumentFormat,
    extractor: &dyn PdfExtractor,
) -> Result<Document, KteError> {
    let text = match format {
        DocumentFormat::Pdf => {
            tracing::debug!(backend = extractor.backend_name(), bytes = bytes.len(), "extracting PDF text");
            extractor.extract_text(bytes)?
        }
        _ => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                KteError::UnsupportedFormat(format!("{format} input is not valid UTF-8: {e}"))
            })?;
            text.strip_prefix('\u{feff}').unwrap_or(text).to_string()
        }
    };
    Ok(Document { text, format })
}

/// Read and decode a file, picking the format from its extension.
pub fn load_document(path: &Path, extractor: &dyn PdfExtractor) -> Result<Document, KteError> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, format, extractor)
}
