pub mod extract;
pub mod headers;
pub mod options;

use clap::Args;
use kte_core::document::pdftotext::PdftotextExtractor;
use kte_core::document::DocumentFormat;
use kte_core::error::KteError;
use kte_core::normalize::TextFormat;
use kte_core::options::{load_options, ExtractionOptions, HeaderDecay};
use kte_core::scoring::config::{Engine, ScorerConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extraction options. Flags override values from `--options`.
#[derive(Args, Debug)]
pub struct OptionArgs {
    /// JSON file with extraction options
    #[arg(long = "options", value_name = "FILE")]
    pub options_file: Option<PathBuf>,

    /// Maximum number of keywords (1-100, default 10)
    #[arg(short = 'k', long)]
    pub max_keywords: Option<usize>,

    /// Minimum relevance score (0.0-1.0, default 0.1)
    #[arg(short = 'r', long)]
    pub min_relevance: Option<f64>,

    /// Header weight multiplier (1.0-5.0, default 1.5)
    #[arg(short = 'w', long)]
    pub header_weight_factor: Option<f64>,

    /// Do not prefer multi-word phrases over single words
    #[arg(long)]
    pub no_prefer_phrases: bool,

    /// Stopword language (default english)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Header decay: linear, stepped or exponential[:ratio]
    #[arg(long, value_name = "SHAPE")]
    pub header_decay: Option<String>,

    /// Deepest header level that still gets a boost (default 6)
    #[arg(long, value_name = "LEVEL")]
    pub max_header_level: Option<u8>,
}

impl OptionArgs {
    pub fn resolve(&self) -> Result<ExtractionOptions, KteError> {
        let mut options = match &self.options_file {
            Some(path) => load_options(path)?,
            None => ExtractionOptions::default(),
        };

        if let Some(k) = self.max_keywords {
            options.max_keywords = k;
        }
        if let Some(r) = self.min_relevance {
            options.min_relevance = r;
        }
        if let Some(w) = self.header_weight_factor {
            options.header_weight_factor = w;
        }
        if self.no_prefer_phrases {
            options.prefer_phrases = false;
        }
        if let Some(lang) = &self.language {
            options.language = lang.clone();
        }
        if let Some(decay) = &self.header_decay {
            options.header_decay = decay.parse::<HeaderDecay>()?;
        }
        if let Some(level) = self.max_header_level {
            options.max_header_level = level;
        }

        options.validated()
    }
}

/// Scorer backend selection. Unset flags fall back to the `KTE_*`
/// environment variables, then to the built-in defaults.
#[derive(Args, Debug, Default)]
pub struct ScorerArgs {
    /// Embedding engine: local, huggingface, stapi or infinity [env: KTE_ENGINE]
    #[arg(long)]
    pub engine: Option<String>,

    /// Endpoint of a remote embedding engine [env: KTE_API_URL]
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token for the remote engine [env: KTE_AUTH_TOKEN]
    #[arg(long)]
    pub auth_token: Option<String>,

    /// Model name sent to the remote engine [env: KTE_MODEL_NAME]
    #[arg(long)]
    pub model_name: Option<String>,

    /// Per-request timeout in seconds [env: KTE_TIMEOUT_SECS]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Texts per embedding request
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl ScorerArgs {
    pub fn config(&self) -> Result<ScorerConfig, KteError> {
        self.apply_to(ScorerConfig::from_env()?)
    }

    fn apply_to(&self, mut config: ScorerConfig) -> Result<ScorerConfig, KteError> {
        if let Some(engine) = &self.engine {
            config.engine = engine.parse::<Engine>()?;
        }
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(token) = &self.auth_token {
            config.auth_token = Some(token.clone());
        }
        if let Some(model) = &self.model_name {
            config.model_name = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.batch_size {
            config.batch_size = n;
        }
        Ok(config)
    }
}

/// PDF backend for a run over `paths`. Fails before any work when one of
/// them is a PDF and pdftotext is missing.
pub fn pdf_extractor<P: AsRef<Path>>(paths: &[P]) -> Result<PdftotextExtractor, KteError> {
    let needs_pdf = paths
        .iter()
        .any(|p| matches!(DocumentFormat::from_path(p.as_ref()), Ok(DocumentFormat::Pdf)));
    if needs_pdf && !PdftotextExtractor::is_available() {
        return Err(KteError::PdftotextNotFound);
    }
    Ok(PdftotextExtractor::new())
}

pub fn parse_text_format(s: &str) -> Result<TextFormat, KteError> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(TextFormat::Auto),
        "markdown" | "md" => Ok(TextFormat::Markdown),
        "html" => Ok(TextFormat::Html),
        "plain" | "text" => Ok(TextFormat::Plain),
        other => Err(KteError::InvalidOptions(format!(
            "unknown input format '{other}' (expected auto, markdown, html or plain)"
        ))),
    }
}
