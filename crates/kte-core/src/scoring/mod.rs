pub mod candidates;
pub mod config;
pub mod embedding;
pub mod fixed;
pub mod remote;
pub mod stopwords;

use crate::error::KteError;
use crate::model::{normalized_key, Candidate};
use candidates::CandidateParams;
use std::collections::HashMap;
use std::time::Instant;
use stopwords::StopwordFilter;

/// Everything a scorer backend gets for one call.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    /// Full normalized document text.
    pub text: &'a str,
    /// Candidate phrases in discovery order.
    pub candidates: &'a [String],
    pub language: &'a str,
    /// Point in time after which the backend should give up.
    pub deadline: Option<Instant>,
}

impl ScoreRequest<'_> {
    /// Whether the deadline has already passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A raw `(phrase, score)` pair as returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPhrase {
    pub phrase: String,
    pub score: f64,
}

impl ScoredPhrase {
    pub fn new(phrase: impl Into<String>, score: f64) -> Self {
        ScoredPhrase {
            phrase: phrase.into(),
            score,
        }
    }
}

/// Trait for relevance scoring backends.
///
/// Scores only need to be comparable within a single call. Failures must be
/// reported as [`KteError::ScoringUnavailable`]; implementations do not
/// retry.
pub trait Scorer: Send + Sync {
    fn score(&self, request: &ScoreRequest<'_>) -> Result<Vec<ScoredPhrase>, KteError>;

    /// Name of this scoring backend (for diagnostics and result metadata).
    fn backend_name(&self) -> &str;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, request: &ScoreRequest<'_>) -> Result<Vec<ScoredPhrase>, KteError> {
        (**self).score(request)
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }
}

/// Output of the scoring stage.
#[derive(Debug, Clone)]
pub struct ScoredCandidates {
    pub candidates: Vec<Candidate>,
    /// Number of generated candidates sent to the backend.
    pub generated: usize,
}

/// Generate candidates from `text` and score them with `scorer`.
///
/// Phrases returned by the backend that were not generated here are kept
/// and ordered after all generated ones. Non-finite scores are dropped and
/// the rest are clamped to `[0, 1]`.
pub fn score_candidates(
    scorer: &dyn Scorer,
    text: &str,
    language: &str,
    params: &CandidateParams,
    deadline: Option<Instant>,
) -> Result<ScoredCandidates, KteError> {
    let stopwords = StopwordFilter::new(language);
    let generated = candidates::generate(text, &stopwords, params);
    let phrases: Vec<String> = generated.iter().map(|c| c.text.clone()).collect();
    let order: HashMap<String, usize> = generated
        .iter()
        .map(|c| (normalized_key(&c.text), c.order))
        .collect();

    let request = ScoreRequest {
        text,
        candidates: &phrases,
        language,
        deadline,
    };
    let raw = scorer.score(&request)?;

    let mut extra = generated.len();
    let mut out = Vec::with_capacity(raw.len());
    for scored in raw {
        if !scored.score.is_finite() {
            tracing::warn!(
                phrase = %scored.phrase,
                backend = scorer.backend_name(),
                "dropping non-finite score"
            );
            continue;
        }
        if scored.phrase.trim().is_empty() {
            continue;
        }
        let position = match order.get(&normalized_key(&scored.phrase)) {
            Some(&o) => o,
            None => {
                extra += 1;
                extra - 1
            }
        };
        out.push(Candidate::new(
            scored.phrase.split_whitespace().collect::<Vec<_>>().join(" "),
            scored.score.clamp(0.0, 1.0),
            position,
        ));
    }

    Ok(ScoredCandidates {
        candidates: out,
        generated: generated.len(),
    })
}
