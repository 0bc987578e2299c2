pub mod document;
pub mod error;
pub mod model;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod weighting;

use document::PdfExtractor;
use error::KteError;
use model::ExtractionResult;
use normalize::{NormalizedText, TextFormat};
use options::ExtractionOptions;
use pipeline::Pipeline;
use rayon::prelude::*;
use scoring::Scorer;
use std::path::Path;
use std::time::Instant;

/// Main API entry point: extract ranked keywords from raw text.
///
/// The format is detected from the content (HTML headings, markdown
/// headers, then plain-text heuristics).
pub fn extract_keywords(
    text: &str,
    scorer: &dyn Scorer,
    options: &ExtractionOptions,
) -> Result<ExtractionResult, KteError> {
    extract_with_deadline(text, TextFormat::Auto, scorer, options, None)
}

/// Like [`extract_keywords`] with an explicit format hint and an optional
/// deadline for the scoring backend.
pub fn extract_with_deadline(
    text: &str,
    format: TextFormat,
    scorer: &dyn Scorer,
    options: &ExtractionOptions,
    deadline: Option<Instant>,
) -> Result<ExtractionResult, KteError> {
    Pipeline::new(scorer).run(text, format, options, deadline)
}

/// Read a document from disk and extract keywords from it.
pub fn extract_document(
    path: &Path,
    extractor: &dyn PdfExtractor,
    scorer: &dyn Scorer,
    options: &ExtractionOptions,
    deadline: Option<Instant>,
) -> Result<ExtractionResult, KteError> {
    let doc = document::load_document(path, extractor)?;
    tracing::debug!(path = %path.display(), format = %doc.format, "loaded document");
    extract_with_deadline(&doc.text, doc.text_format(), scorer, options, deadline)
}

/// Extract from many texts in parallel. Results are in input order and
/// each extraction fails or succeeds on its own.
pub fn extract_batch<S: AsRef<str> + Sync>(
    texts: &[S],
    scorer: &dyn Scorer,
    options: &ExtractionOptions,
) -> Vec<Result<ExtractionResult, KteError>> {
    texts
        .par_iter()
        .map(|text| extract_keywords(text.as_ref(), scorer, options))
        .collect()
}

/// Decode a document and run only the normalizer (no scoring).
pub fn normalize_document(
    path: &Path,
    extractor: &dyn PdfExtractor,
) -> Result<NormalizedText, KteError> {
    let doc = document::load_document(path, extractor)?;
    normalize::normalize(&doc.text, doc.text_format())
}
