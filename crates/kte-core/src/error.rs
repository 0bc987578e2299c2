use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum KteError {
    #[error("input text is empty or contains only whitespace")]
    EmptyInput,

    #[error("invalid extraction options: {0}")]
    InvalidOptions(String),

    #[error("scoring backend unavailable: {0}")]
    ScoringUnavailable(ScoringFailure),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to load options from {path}: {reason}")]
    OptionsLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why the scorer could not produce scores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringFailure {
    /// The caller deadline or the backend request timeout elapsed.
    #[error("timed out after {:.2}s", .after.as_secs_f64())]
    Timeout { after: Duration },
    /// The backend was reachable but failed, or could not be reached.
    #[error("{backend}: {reason}")]
    Backend { backend: String, reason: String },
}

/// Coarse cause of a failure, for callers that branch on input vs backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Options,
    Scoring,
    Other,
}

impl KteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KteError::EmptyInput
            | KteError::UnsupportedFormat(_)
            | KteError::Extraction(_)
            | KteError::PdftotextNotFound
            | KteError::PdftotextFailed { .. } => ErrorKind::Input,
            KteError::InvalidOptions(_) | KteError::OptionsLoad { .. } => ErrorKind::Options,
            KteError::ScoringUnavailable(_) => ErrorKind::Scoring,
            KteError::Io(_) | KteError::Json(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn backend(backend: &str, reason: impl Into<String>) -> Self {
        KteError::ScoringUnavailable(ScoringFailure::Backend {
            backend: backend.to_string(),
            reason: reason.into(),
        })
    }

    pub(crate) fn timeout(after: Duration) -> Self {
        KteError::ScoringUnavailable(ScoringFailure::Timeout { after })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            KteError::ScoringUnavailable(ScoringFailure::Timeout { .. })
        )
    }
}
