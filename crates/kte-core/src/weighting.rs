//! Header weighting: boosts candidates that appear inside section headers.

use crate::model::Candidate;
use crate::normalize::NormalizedText;
use crate::options::{ExtractionOptions, HeaderDecay};
use crate::scoring::candidates::token_runs;

/// Per-level multipliers for [`HeaderDecay::Stepped`], levels 1 through 5.
const STEPPED_TABLE: [f64; 5] = [2.0, 1.5, 1.3, 1.2, 1.1];

/// Multiplier for a header of `level` under `options`.
///
/// Always in `[1.0, header_weight_factor]` and non-increasing in `level`.
pub fn header_weight(level: u8, options: &ExtractionOptions) -> f64 {
    let factor = options.header_weight_factor;
    let max_level = options.max_header_level;
    if level == 0 || level > max_level {
        return 1.0;
    }
    let steps = f64::from(level - 1);
    let weight = match options.header_decay {
        HeaderDecay::Linear => factor - (factor - 1.0) * steps / f64::from(max_level),
        HeaderDecay::Stepped => {
            let t = STEPPED_TABLE
                .get(usize::from(level) - 1)
                .copied()
                .unwrap_or(1.0);
            1.0 + (factor - 1.0) * (t - 1.0)
        }
        HeaderDecay::Exponential { ratio } => 1.0 + (factor - 1.0) * ratio.powf(steps),
    };
    weight.max(1.0)
}

struct HeaderWords {
    level: u8,
    words: Vec<String>,
}

fn words(text: &str) -> Vec<String> {
    token_runs(text).into_iter().flatten().collect()
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Re-score candidates against the header spans of `doc`.
///
/// A candidate matching one or more headers gets a positive raw score
/// multiplied by the best matching level's weight, capped at 1.0, and is
/// marked `from_header`. Everything else passes through unchanged.
pub fn apply_header_weighting(
    candidates: &[Candidate],
    doc: &NormalizedText,
    options: &ExtractionOptions,
) -> Vec<Candidate> {
    let headers: Vec<HeaderWords> = doc
        .headers
        .iter()
        .map(|span| HeaderWords {
            level: span.level,
            words: words(doc.header_text(span)),
        })
        .collect();

    candidates
        .iter()
        .map(|candidate| {
            let needle = words(candidate.text());
            let best = headers
                .iter()
                .filter(|h| contains_run(&h.words, &needle))
                .map(|h| header_weight(h.level, options))
                .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))));

            match best {
                Some(weight) if candidate.score() > 0.0 => {
                    let score = (candidate.score() * weight).min(1.0);
                    candidate.reweighted(score, true)
                }
                Some(_) => candidate.reweighted(candidate.score(), true),
                None => candidate.reweighted(candidate.score(), false),
            }
        })
        .collect()
}

/// Summary of header versus body candidates, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeaderStats {
    pub header_count: usize,
    pub header_mean: f64,
    pub body_count: usize,
    pub body_mean: f64,
}

impl HeaderStats {
    pub fn collect(candidates: &[Candidate]) -> Self {
        let (mut hc, mut hs, mut bc, mut bs) = (0usize, 0.0f64, 0usize, 0.0f64);
        for c in candidates {
            if c.from_header() {
                hc += 1;
                hs += c.score();
            } else {
                bc += 1;
                bs += c.score();
            }
        }
        let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };
        HeaderStats {
            header_count: hc,
            header_mean: mean(hs, hc),
            body_count: bc,
            body_mean: mean(bs, bc),
        }
    }
}
