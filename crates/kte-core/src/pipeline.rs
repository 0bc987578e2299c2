//! Extraction orchestrator: runs normalize → score → weight → rank.

use crate::error::KteError;
use crate::model::{ExtractionMetadata, ExtractionResult, KeywordSummary};
use crate::normalize::{self, TextFormat};
use crate::options::ExtractionOptions;
use crate::ranking;
use crate::scoring::candidates::CandidateParams;
use crate::scoring::{self, Scorer};
use crate::weighting::{self, HeaderStats};
use chrono::Utc;
use std::fmt;
use std::time::Instant;

/// Identifier reported in [`ExtractionResult::extraction_method`].
pub const EXTRACTION_METHOD: &str = "header-weighted-similarity";

/// Where a pipeline run currently is. `Failed` can follow any working stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Normalizing,
    Scoring,
    Weighting,
    Ranking,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Normalizing => "normalizing",
            Stage::Scoring => "scoring",
            Stage::Weighting => "weighting",
            Stage::Ranking => "ranking",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One extraction at a time over a shared scorer.
///
/// A pipeline holds only per-call state; for parallel work create one per
/// thread and share the scorer.
pub struct Pipeline<'a> {
    scorer: &'a dyn Scorer,
    stage: Stage,
    failed_at: Option<Stage>,
}

impl<'a> Pipeline<'a> {
    pub fn new(scorer: &'a dyn Scorer) -> Self {
        Pipeline {
            scorer,
            stage: Stage::Idle,
            failed_at: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The stage that was running when the last run failed.
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    /// Run a full extraction. Every call starts again from [`Stage::Idle`].
    pub fn run(
        &mut self,
        raw: &str,
        format: TextFormat,
        options: &ExtractionOptions,
        deadline: Option<Instant>,
    ) -> Result<ExtractionResult, KteError> {
        self.stage = Stage::Idle;
        self.failed_at = None;

        let result = self.run_stages(raw, format, options, deadline);
        match &result {
            Ok(_) => self.stage = Stage::Done,
            Err(e) => {
                tracing::warn!(stage = %self.stage, error = %e, "extraction failed");
                self.failed_at = Some(self.stage);
                self.stage = Stage::Failed;
            }
        }
        result
    }

    fn run_stages(
        &mut self,
        raw: &str,
        format: TextFormat,
        options: &ExtractionOptions,
        deadline: Option<Instant>,
    ) -> Result<ExtractionResult, KteError> {
        let started = Instant::now();
        // No stage runs on invalid options
        let options = options.clone().validated()?;

        self.stage = Stage::Normalizing;
        let doc = normalize::normalize(raw, format)?;
        tracing::debug!(
            format = %format,
            chars = doc.text.chars().count(),
            headers = doc.headers.len(),
            "normalized input"
        );

        self.stage = Stage::Scoring;
        let scoring_started = Instant::now();
        let scored = scoring::score_candidates(
            self.scorer,
            &doc.text,
            &options.language,
            &CandidateParams::default(),
            deadline,
        )?;
        let scoring_elapsed = scoring_started.elapsed();
        // Late results are discarded, never partially used
        if deadline.is_some_and(|d| Instant::now() > d) {
            return Err(KteError::timeout(scoring_elapsed));
        }
        tracing::debug!(
            backend = self.scorer.backend_name(),
            generated = scored.generated,
            scored = scored.candidates.len(),
            elapsed_ms = scoring_elapsed.as_millis() as u64,
            "scored candidates"
        );

        self.stage = Stage::Weighting;
        let weighted = weighting::apply_header_weighting(&scored.candidates, &doc, &options);
        let stats = HeaderStats::collect(&weighted);
        tracing::debug!(
            header_candidates = stats.header_count,
            header_mean = stats.header_mean,
            body_candidates = stats.body_count,
            body_mean = stats.body_mean,
            "applied header weighting"
        );

        self.stage = Stage::Ranking;
        let keywords = ranking::rank(weighted, &options);

        let processing_time = started.elapsed().as_secs_f64();
        tracing::info!(
            keywords = keywords.len(),
            processing_time,
            "extraction complete"
        );

        let summary = KeywordSummary::of(&keywords);
        Ok(ExtractionResult {
            keywords,
            extraction_method: EXTRACTION_METHOD.to_string(),
            timestamp: Utc::now(),
            metadata: ExtractionMetadata {
                processing_time,
                input_length: raw.chars().count(),
                normalized_length: doc.text.chars().count(),
                header_count: doc.headers.len(),
                candidate_count: scored.generated,
                scorer_backend: self.scorer.backend_name().to_string(),
                options_used: options,
                summary,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixed::StaticScorer;
    use crate::scoring::{ScoreRequest, ScoredPhrase};
    use std::time::Duration;

    struct SlowScorer(Duration);

    impl Scorer for SlowScorer {
        fn score(&self, request: &ScoreRequest<'_>) -> Result<Vec<ScoredPhrase>, KteError> {
            std::thread::sleep(self.0);
            Ok(request
                .candidates
                .iter()
                .map(|c| ScoredPhrase::new(c.clone(), 0.5))
                .collect())
        }

        fn backend_name(&self) -> &str {
            "slow"
        }
    }

    #[test]
    fn test_successful_run_ends_done() {
        let scorer = StaticScorer::new([("rockets", 0.8)]);
        let mut pipeline = Pipeline::new(&scorer);
        assert_eq!(pipeline.stage(), Stage::Idle);
        let result = pipeline
            .run("Rockets fly.", TextFormat::Auto, &ExtractionOptions::default(), None)
            .unwrap();
        assert_eq!(pipeline.stage(), Stage::Done);
        assert_eq!(result.keywords.len(), 1);
        assert_eq!(result.metadata.scorer_backend, "static");
        assert_eq!(result.extraction_method, EXTRACTION_METHOD);
    }

    #[test]
    fn test_invalid_options_fail_before_normalizing() {
        let scorer = StaticScorer::default();
        let mut pipeline = Pipeline::new(&scorer);
        let opts = ExtractionOptions::default().with_max_keywords(0);
        let err = pipeline.run("text", TextFormat::Auto, &opts, None).unwrap_err();
        assert!(matches!(err, KteError::InvalidOptions(_)));
        assert_eq!(pipeline.stage(), Stage::Failed);
        assert_eq!(pipeline.failed_at(), Some(Stage::Idle));
    }

    #[test]
    fn test_empty_input_fails_in_normalizing() {
        let scorer = StaticScorer::default();
        let mut pipeline = Pipeline::new(&scorer);
        let err = pipeline
            .run("   ", TextFormat::Auto, &ExtractionOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, KteError::EmptyInput));
        assert_eq!(pipeline.failed_at(), Some(Stage::Normalizing));
    }

    #[test]
    fn test_late_scorer_result_discarded() {
        let scorer = SlowScorer(Duration::from_millis(30));
        let mut pipeline = Pipeline::new(&scorer);
        let deadline = Instant::now() + Duration::from_millis(5);
        let err = pipeline
            .run("Rockets fly.", TextFormat::Auto, &ExtractionOptions::default(), Some(deadline))
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(pipeline.failed_at(), Some(Stage::Scoring));
    }

    #[test]
    fn test_metadata_counts() {
        let scorer = StaticScorer::new([("space exploration", 0.6)]);
        let mut pipeline = Pipeline::new(&scorer);
        let result = pipeline
            .run(
                "# Space Exploration\nHumans dreamed of space exploration.",
                TextFormat::Auto,
                &ExtractionOptions::default(),
                None,
            )
            .unwrap();
        assert_eq!(result.metadata.header_count, 1);
        assert!(result.metadata.candidate_count > 0);
        assert_eq!(
            result.metadata.input_length,
            "# Space Exploration\nHumans dreamed of space exploration.".chars().count()
        );
    }
}
