use super::{ScoreRequest, ScoredPhrase, Scorer};
use crate::error::KteError;
use crate::model::normalized_key;
use std::collections::HashMap;

/// Scorer backed by a fixed phrase → score table.
///
/// Returns a score for every requested candidate present in the table, in
/// request order. Useful for precomputed scores and as a deterministic stub.
#[derive(Debug, Clone, Default)]
pub struct StaticScorer {
    scores: HashMap<String, f64>,
}

impl StaticScorer {
    pub fn new<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        StaticScorer {
            scores: scores
                .into_iter()
                .map(|(p, s)| (normalized_key(p.as_ref()), s))
                .collect(),
        }
    }
}

impl Scorer for StaticScorer {
    fn score(&self, request: &ScoreRequest<'_>) -> Result<Vec<ScoredPhrase>, KteError> {
        Ok(request
            .candidates
            .iter()
            .filter_map(|c| {
                self.scores
                    .get(&normalized_key(c))
                    .map(|&s| ScoredPhrase::new(c.clone(), s))
            })
            .collect())
    }

    fn backend_name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_known_candidates_scored() {
        let scorer = StaticScorer::new([("Mars Colonization", 0.55), ("humans", 0.3)]);
        let candidates = vec![
            "humans".to_string(),
            "dreamed".to_string(),
            "mars colonization".to_string(),
        ];
        let request = ScoreRequest {
            text: "",
            candidates: &candidates,
            language: "english",
            deadline: None,
        };
        let scored = scorer.score(&request).unwrap();
        assert_eq!(
            scored,
            vec![
                ScoredPhrase::new("humans", 0.3),
                ScoredPhrase::new("mars colonization", 0.55),
            ]
        );
    }
}
