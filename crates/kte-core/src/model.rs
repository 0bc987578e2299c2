use crate::options::ExtractionOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scored keyword or phrase proposed for the result.
///
/// Candidates are never mutated after scoring: header weighting builds a new
/// value through [`Candidate::reweighted`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(rename = "phrase")]
    text: String,
    #[serde(rename = "relevance_score")]
    score: f64,
    is_phrase: bool,
    from_header: bool,
    #[serde(skip)]
    word_count: usize,
    /// Position of first occurrence in the document, for stable tie-breaks.
    #[serde(skip)]
    order: usize,
}

impl Candidate {
    pub fn new(text: impl Into<String>, score: f64, order: usize) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Candidate {
            text,
            score,
            is_phrase: word_count > 1,
            from_header: false,
            word_count,
            order,
        }
    }

    /// A copy of this candidate carrying a new score and header provenance.
    pub fn reweighted(&self, score: f64, from_header: bool) -> Self {
        Candidate {
            score,
            from_header,
            ..self.clone()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_phrase(&self) -> bool {
        self.is_phrase
    }

    pub fn from_header(&self) -> bool {
        self.from_header
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Case- and whitespace-insensitive identity used for deduplication.
    pub fn key(&self) -> String {
        normalized_key(&self.text)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_phrase { "phrase" } else { "keyword" };
        let header = if self.from_header { " (header)" } else { "" };
        write!(f, "{} ({:.3}) - {}{}", self.text, self.score, kind, header)
    }
}

/// Lowercase and collapse whitespace.
pub fn normalized_key(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a header was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    Markdown,
    Setext,
    Html,
    Plain,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderKind::Markdown => write!(f, "markdown"),
            HeaderKind::Setext => write!(f, "setext"),
            HeaderKind::Html => write!(f, "html"),
            HeaderKind::Plain => write!(f, "plain"),
        }
    }
}

/// A heading found during normalization. `start..end` is a byte range into
/// the normalized text and always covers exactly `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSpan {
    pub start: usize,
    pub end: usize,
    /// 1 is the most significant level.
    pub level: u8,
    pub text: String,
    pub kind: HeaderKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Wall-clock seconds spent in the extraction call.
    pub processing_time: f64,
    /// Length of the raw input in characters.
    pub input_length: usize,
    pub options_used: ExtractionOptions,
    pub normalized_length: usize,
    pub header_count: usize,
    pub candidate_count: usize,
    pub scorer_backend: String,
    pub summary: KeywordSummary,
}

/// Counts and relevance range over the returned keywords.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KeywordSummary {
    pub total_keywords: usize,
    pub phrases_count: usize,
    pub single_words_count: usize,
    pub header_keywords_count: usize,
    pub average_relevance: f64,
    /// `None` when no keywords were returned.
    pub max_relevance: Option<f64>,
    pub min_relevance: Option<f64>,
}

impl KeywordSummary {
    pub fn of(keywords: &[Candidate]) -> Self {
        let total = keywords.len();
        let phrases = keywords.iter().filter(|k| k.is_phrase()).count();
        let scores = keywords.iter().map(|k| k.score());
        KeywordSummary {
            total_keywords: total,
            phrases_count: phrases,
            single_words_count: total - phrases,
            header_keywords_count: keywords.iter().filter(|k| k.from_header()).count(),
            average_relevance: if total == 0 {
                0.0
            } else {
                scores.clone().sum::<f64>() / total as f64
            },
            max_relevance: scores.clone().reduce(f64::max),
            min_relevance: scores.reduce(f64::min),
        }
    }
}

/// Ranked keywords for one document, highest relevance first.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub keywords: Vec<Candidate>,
    pub extraction_method: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_summary_counts() {
        let keywords = vec![
            Candidate::new("space exploration", 0.6, 0).reweighted(1.0, true),
            Candidate::new("mars colonization", 0.55, 1),
            Candidate::new("humans", 0.3, 2),
        ];
        let summary = KeywordSummary::of(&keywords);
        assert_eq!(summary.total_keywords, 3);
        assert_eq!(summary.phrases_count, 2);
        assert_eq!(summary.single_words_count, 1);
        assert_eq!(summary.header_keywords_count, 1);
        assert!((summary.average_relevance - 1.85 / 3.0).abs() < 1e-9);
        assert_eq!(summary.max_relevance, Some(1.0));
        assert_eq!(summary.min_relevance, Some(0.3));
    }

    #[test]
    fn test_keyword_summary_of_nothing() {
        let summary = KeywordSummary::of(&[]);
        assert_eq!(summary, KeywordSummary::default());
        assert_eq!(summary.max_relevance, None);
    }

    #[test]
    fn test_candidate_derives_phrase_flag() {
        let c = Candidate::new("space exploration", 0.6, 0);
        assert_eq!(c.word_count(), 2);
        assert!(c.is_phrase());
        assert!(!Candidate::new("humans", 0.3, 1).is_phrase());
    }

    #[test]
    fn test_reweighted_leaves_source_untouched() {
        let c = Candidate::new("mars", 0.4, 3);
        let w = c.reweighted(0.8, true);
        assert_eq!(c.score(), 0.4);
        assert!(!c.from_header());
        assert_eq!(w.score(), 0.8);
        assert!(w.from_header());
        assert_eq!(w.order(), 3);
    }

    #[test]
    fn test_normalized_key() {
        assert_eq!(normalized_key("  Space   EXPLORATION "), "space exploration");
    }

    #[test]
    fn test_candidate_json_shape() {
        let c = Candidate::new("deep space", 0.5, 0).reweighted(0.75, true);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["phrase"], "deep space");
        assert_eq!(v["relevance_score"], 0.75);
        assert_eq!(v["is_phrase"], true);
        assert_eq!(v["from_header"], true);
        assert!(v.get("order").is_none());
    }
}
