use crate::error::KteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const MAX_KEYWORDS_LIMIT: usize = 100;
pub const MAX_HEADER_WEIGHT_FACTOR: f64 = 5.0;

/// How the header boost shrinks as the header level number grows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum HeaderDecay {
    /// Equal steps from the full factor at level 1 towards 1.0.
    #[default]
    Linear,
    /// Fixed per-level table (2.0, 1.5, 1.3, 1.2, 1.1) rescaled to the factor.
    Stepped,
    /// Boost above 1.0 multiplied by `ratio` for every level below the first.
    Exponential { ratio: f64 },
}

impl fmt::Display for HeaderDecay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderDecay::Linear => write!(f, "linear"),
            HeaderDecay::Stepped => write!(f, "stepped"),
            HeaderDecay::Exponential { ratio } => write!(f, "exponential:{ratio}"),
        }
    }
}

impl FromStr for HeaderDecay {
    type Err = KteError;

    /// Accepts `linear`, `stepped`, `exponential` (ratio 0.5) or
    /// `exponential:<ratio>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (shape, arg) = match lower.split_once(':') {
            Some((shape, arg)) => (shape, Some(arg)),
            None => (lower.as_str(), None),
        };
        match (shape, arg) {
            ("linear", None) => Ok(HeaderDecay::Linear),
            ("stepped", None) => Ok(HeaderDecay::Stepped),
            ("exponential", None) => Ok(HeaderDecay::Exponential { ratio: 0.5 }),
            ("exponential", Some(arg)) => {
                let ratio = arg.trim().parse::<f64>().map_err(|_| {
                    KteError::InvalidOptions(format!("invalid exponential decay ratio '{arg}'"))
                })?;
                Ok(HeaderDecay::Exponential { ratio })
            }
            _ => Err(KteError::InvalidOptions(format!(
                "unknown header decay '{s}' (expected linear, stepped or exponential[:ratio])"
            ))),
        }
    }
}

/// Knobs for a single extraction call. Treated as a value: every call gets
/// its own validated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    pub max_keywords: usize,
    pub min_relevance: f64,
    pub header_weight_factor: f64,
    pub prefer_phrases: bool,
    pub language: String,
    pub header_decay: HeaderDecay,
    /// Headers below this level get no boost.
    pub max_header_level: u8,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        ExtractionOptions {
            max_keywords: 10,
            min_relevance: 0.1,
            header_weight_factor: 1.5,
            prefer_phrases: true,
            language: "english".into(),
            header_decay: HeaderDecay::Linear,
            max_header_level: 6,
        }
    }
}

impl ExtractionOptions {
    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub fn with_min_relevance(mut self, min_relevance: f64) -> Self {
        self.min_relevance = min_relevance;
        self
    }

    pub fn with_header_weight_factor(mut self, factor: f64) -> Self {
        self.header_weight_factor = factor;
        self
    }

    pub fn with_prefer_phrases(mut self, prefer_phrases: bool) -> Self {
        self.prefer_phrases = prefer_phrases;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_header_decay(mut self, decay: HeaderDecay) -> Self {
        self.header_decay = decay;
        self
    }

    pub fn with_max_header_level(mut self, level: u8) -> Self {
        self.max_header_level = level;
        self
    }

    /// Validate and return the canonical form (trimmed, lowercase language).
    pub fn validated(mut self) -> Result<Self, KteError> {
        self.validate()?;
        self.language = self.language.trim().to_lowercase();
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), KteError> {
        if self.max_keywords == 0 {
            return Err(KteError::InvalidOptions(
                "max_keywords must be positive".into(),
            ));
        }
        if self.max_keywords > MAX_KEYWORDS_LIMIT {
            return Err(KteError::InvalidOptions(format!(
                "max_keywords cannot exceed {MAX_KEYWORDS_LIMIT}, got {}",
                self.max_keywords
            )));
        }

        if !self.min_relevance.is_finite() || !(0.0..=1.0).contains(&self.min_relevance) {
            return Err(KteError::InvalidOptions(format!(
                "min_relevance must be between 0.0 and 1.0, got {}",
                self.min_relevance
            )));
        }

        if !self.header_weight_factor.is_finite()
            || !(1.0..=MAX_HEADER_WEIGHT_FACTOR).contains(&self.header_weight_factor)
        {
            return Err(KteError::InvalidOptions(format!(
                "header_weight_factor must be between 1.0 and {MAX_HEADER_WEIGHT_FACTOR}, got {}",
                self.header_weight_factor
            )));
        }

        if self.language.trim().is_empty() {
            return Err(KteError::InvalidOptions("language must not be empty".into()));
        }

        if !(1..=16).contains(&self.max_header_level) {
            return Err(KteError::InvalidOptions(format!(
                "max_header_level must be between 1 and 16, got {}",
                self.max_header_level
            )));
        }

        if let HeaderDecay::Exponential { ratio } = self.header_decay {
            if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
                return Err(KteError::InvalidOptions(format!(
                    "exponential decay ratio must be strictly between 0 and 1, got {ratio}"
                )));
            }
        }

        Ok(())
    }
}

/// Load options from a JSON file. Missing fields take their defaults.
pub fn load_options(path: &Path) -> Result<ExtractionOptions, KteError> {
    let content = std::fs::read_to_string(path).map_err(|e| KteError::OptionsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let options: ExtractionOptions =
        serde_json::from_str(&content).map_err(|e| KteError::OptionsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    options.validated()
}

/// Parse options from a JSON string (no file path context).
pub fn parse_options_str(json: &str) -> Result<ExtractionOptions, KteError> {
    let options: ExtractionOptions = serde_json::from_str(json)?;
    options.validated()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let opts = ExtractionOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.max_keywords, 10);
        assert_eq!(opts.min_relevance, 0.1);
        assert_eq!(opts.header_weight_factor, 1.5);
        assert!(opts.prefer_phrases);
    }

    #[test]
    fn test_zero_max_keywords_rejected() {
        let err = ExtractionOptions::default()
            .with_max_keywords(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_keywords"));
    }

    #[test]
    fn test_min_relevance_bounds() {
        assert!(ExtractionOptions::default()
            .with_min_relevance(1.5)
            .validate()
            .is_err());
        assert!(ExtractionOptions::default()
            .with_min_relevance(-0.1)
            .validate()
            .is_err());
        assert!(ExtractionOptions::default()
            .with_min_relevance(f64::NAN)
            .validate()
            .is_err());
        assert!(ExtractionOptions::default()
            .with_min_relevance(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_header_weight_factor_below_one_rejected() {
        assert!(ExtractionOptions::default()
            .with_header_weight_factor(0.5)
            .validate()
            .is_err());
        assert!(ExtractionOptions::default()
            .with_header_weight_factor(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_language_lowercased() {
        let opts = ExtractionOptions::default()
            .with_language(" English ")
            .validated()
            .unwrap();
        assert_eq!(opts.language, "english");
        assert!(ExtractionOptions::default()
            .with_language("  ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_header_decay_from_str() {
        assert_eq!("linear".parse::<HeaderDecay>().unwrap(), HeaderDecay::Linear);
        assert_eq!(
            "Exponential:0.25".parse::<HeaderDecay>().unwrap(),
            HeaderDecay::Exponential { ratio: 0.25 }
        );
        assert!("cubic".parse::<HeaderDecay>().is_err());
    }

    #[test]
    fn test_exponential_ratio_validated() {
        let opts = ExtractionOptions::default()
            .with_header_decay(HeaderDecay::Exponential { ratio: 1.0 });
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_parse_options_partial_json() {
        let opts = parse_options_str(
            r#"{ "max_keywords": 5, "header_decay": { "shape": "stepped" } }"#,
        )
        .unwrap();
        assert_eq!(opts.max_keywords, 5);
        assert_eq!(opts.header_decay, HeaderDecay::Stepped);
        assert_eq!(opts.min_relevance, 0.1);
    }

    #[test]
    fn test_parse_options_invalid_values_rejected() {
        assert!(parse_options_str(r#"{ "min_relevance": 2.0 }"#).is_err());
    }
}
