//! Candidate generation: contiguous stopword-free n-grams.

use super::stopwords::StopwordFilter;
use std::collections::HashMap;

/// Parameters for candidate generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateParams {
    /// Longest n-gram, in tokens.
    pub max_ngram: usize,
    /// Upper bound on distinct candidates sent to the scorer.
    pub max_candidates: usize,
}

impl Default for CandidateParams {
    fn default() -> Self {
        CandidateParams {
            max_ngram: 3,
            max_candidates: 256,
        }
    }
}

/// A distinct candidate surface form in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateText {
    pub text: String,
    pub order: usize,
    pub frequency: usize,
}

/// Split text into runs of lowercase tokens. Line breaks and punctuation end
/// a run so that n-grams never span them.
pub fn token_runs(text: &str) -> Vec<Vec<String>> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            word.push(c);
            continue;
        }
        let joins_word = matches!(c, '-' | '\'' | '\u{2019}')
            && !word.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        if joins_word {
            word.push(if c == '\u{2019}' { '\'' } else { c });
            continue;
        }

        if !word.is_empty() {
            current.push(std::mem::take(&mut word).to_lowercase());
        }
        if c == ' ' || c == '\t' {
            continue;
        }
        if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }

    if !word.is_empty() {
        current.push(word.to_lowercase());
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn is_content_token(token: &str, stopwords: &StopwordFilter) -> bool {
    token.chars().count() >= 2
        && !token.chars().all(|c| c.is_numeric())
        && !stopwords.is_stopword(token)
}

/// Generate candidates from normalized text.
///
/// When more than `max_candidates` distinct forms exist the most frequent
/// are kept, ties going to the earlier one; the result is always in order of
/// first occurrence.
pub fn generate(text: &str, stopwords: &StopwordFilter, params: &CandidateParams) -> Vec<CandidateText> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut found: Vec<CandidateText> = Vec::new();
    let max_ngram = params.max_ngram.max(1);

    for run in token_runs(text) {
        let content: Vec<bool> = run.iter().map(|t| is_content_token(t, stopwords)).collect();
        for start in 0..run.len() {
            for len in 1..=max_ngram {
                let end = start + len;
                if end > run.len() || !content[start..end].iter().all(|&ok| ok) {
                    break;
                }
                let phrase = run[start..end].join(" ");
                match index.get(&phrase) {
                    Some(&i) => found[i].frequency += 1,
                    None => {
                        index.insert(phrase.clone(), found.len());
                        found.push(CandidateText {
                            text: phrase,
                            order: found.len(),
                            frequency: 1,
                        });
                    }
                }
            }
        }
    }

    if found.len() > params.max_candidates {
        found.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.order.cmp(&b.order)));
        found.truncate(params.max_candidates);
        found.sort_by_key(|c| c.order);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(cands: &[CandidateText]) -> Vec<&str> {
        cands.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_token_runs_break_on_punctuation_and_lines() {
        let runs = token_runs("Deep-space probes, launched.\nMars rover's arm");
        assert_eq!(
            runs,
            vec![
                vec!["deep-space".to_string(), "probes".to_string()],
                vec!["launched".to_string()],
                vec!["mars".to_string(), "rover's".to_string(), "arm".to_string()],
            ]
        );
    }

    #[test]
    fn test_ngrams_skip_stopwords() {
        let stop = StopwordFilter::from_list(&["of", "and"]);
        let cands = generate("history of space exploration and rockets", &stop, &CandidateParams::default());
        let t = texts(&cands);
        assert!(t.contains(&"space exploration"));
        assert!(!t.iter().any(|c| c.contains(" of ") || c.starts_with("of")));
        assert!(!t.contains(&"history of space"));
    }

    #[test]
    fn test_discovery_order_and_frequency() {
        let stop = StopwordFilter::empty();
        let cands = generate("mars rover\nmars base", &stop, &CandidateParams::default());
        assert_eq!(
            texts(&cands),
            vec!["mars", "mars rover", "rover", "mars base", "base"]
        );
        let mars = cands.iter().find(|c| c.text == "mars").unwrap();
        assert_eq!(mars.frequency, 2);
        assert_eq!(mars.order, 0);
    }

    #[test]
    fn test_max_ngram_respected() {
        let stop = StopwordFilter::empty();
        let params = CandidateParams {
            max_ngram: 2,
            ..CandidateParams::default()
        };
        let cands = generate("alpha beta gamma", &stop, &params);
        assert!(cands.iter().all(|c| c.text.split(' ').count() <= 2));
        assert!(!texts(&cands).contains(&"alpha beta gamma"));
    }

    #[test]
    fn test_short_and_numeric_tokens_dropped() {
        let stop = StopwordFilter::empty();
        let cands = generate("x 2024 apollo", &stop, &CandidateParams::default());
        assert_eq!(texts(&cands), vec!["apollo"]);
    }

    #[test]
    fn test_max_candidates_keeps_most_frequent() {
        let stop = StopwordFilter::empty();
        let params = CandidateParams {
            max_ngram: 1,
            max_candidates: 2,
        };
        let cands = generate("comet.\nasteroid.\nasteroid.\nplanet.\nplanet.\nplanet.", &stop, &params);
        assert_eq!(texts(&cands), vec!["asteroid", "planet"]);
    }
}
