use kte_core::error::KteError;
use std::path::Path;

use super::pdf_extractor;
use crate::output;

pub fn run(input_file: &Path, output_format: &str) -> Result<(), KteError> {
    let extractor = pdf_extractor(&[input_file])?;
    let normalized = kte_core::normalize_document(input_file, &extractor)?;

    match output_format {
        "json" => output::json::print(&normalized.headers)?,
        _ => output::text::print_headers(&normalized),
    }
    Ok(())
}
