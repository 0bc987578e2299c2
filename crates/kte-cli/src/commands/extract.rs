use kte_core::error::KteError;
use kte_core::model::ExtractionResult;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::{parse_text_format, pdf_extractor, OptionArgs, ScorerArgs};
use crate::output;

pub struct ExtractArgs {
    pub files: Vec<PathBuf>,
    pub text: Option<String>,
    pub input_format: String,
    pub options: OptionArgs,
    pub scorer: ScorerArgs,
    pub deadline: Option<f64>,
    pub output: String,
    pub out: Option<PathBuf>,
    pub force: bool,
}

pub fn run(args: ExtractArgs) -> Result<(), KteError> {
    let options = args.options.resolve()?;
    let scorer = args.scorer.config()?.build()?;
    tracing::debug!(backend = scorer.backend_name(), "scorer ready");
    let deadline = match args.deadline {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            Some(Instant::now() + Duration::from_secs_f64(secs))
        }
        Some(secs) => {
            return Err(KteError::InvalidOptions(format!(
                "deadline must be a positive number of seconds, got {secs}"
            )))
        }
        None => None,
    };

    let mut results: Vec<(String, ExtractionResult)> = Vec::new();
    match &args.text {
        Some(text) => {
            let format = parse_text_format(&args.input_format)?;
            let result =
                kte_core::extract_with_deadline(text, format, &*scorer, &options, deadline)?;
            results.push(("<text>".to_string(), result));
        }
        None => {
            let extractor = pdf_extractor(&args.files)?;
            for path in &args.files {
                let result = kte_core::extract_document(
                    path,
                    &extractor,
                    &*scorer,
                    &options,
                    deadline,
                )?;
                results.push((path.display().to_string(), result));
            }
        }
    }

    match args.out {
        Some(path) => {
            // Always write JSON when saving to file
            let json = output::json::results_to_string(&results)?;
            output::write_file(&path, &json, args.force)?;
            let total: usize = results.iter().map(|(_, r)| r.keywords.len()).sum();
            eprintln!(
                "Extracted {total} keyword(s) from {} input(s), written to {}",
                results.len(),
                path.display()
            );
        }
        None => match args.output.as_str() {
            "json" => println!("{}", output::json::results_to_string(&results)?),
            _ => output::text::print_results(&results),
        },
    }

    Ok(())
}
