//! Stopword lists for candidate filtering, backed by the `stop-words` crate.

use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("english")
    }
}

impl StopwordFilter {
    /// Build the filter for a language name or ISO 639-1 code. Unknown
    /// languages fall back to English.
    pub fn new(language: &str) -> Self {
        StopwordFilter {
            stopwords: load_stopwords(language),
        }
    }

    pub fn empty() -> Self {
        StopwordFilter {
            stopwords: HashSet::new(),
        }
    }

    pub fn from_list(words: &[&str]) -> Self {
        StopwordFilter {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Expects an already lowercased word.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}

fn load_stopwords(language: &str) -> HashSet<String> {
    let lang = match language.trim().to_lowercase().as_str() {
        "en" | "english" => LANGUAGE::English,
        "de" | "german" => LANGUAGE::German,
        "fr" | "french" => LANGUAGE::French,
        "es" | "spanish" => LANGUAGE::Spanish,
        "it" | "italian" => LANGUAGE::Italian,
        "pt" | "portuguese" => LANGUAGE::Portuguese,
        "nl" | "dutch" => LANGUAGE::Dutch,
        "sv" | "swedish" => LANGUAGE::Swedish,
        "da" | "danish" => LANGUAGE::Danish,
        "no" | "norwegian" => LANGUAGE::Norwegian,
        "fi" | "finnish" => LANGUAGE::Finnish,
        other => {
            tracing::debug!(language = other, "no stopword list, using english");
            LANGUAGE::English
        }
    };

    get(lang).iter().map(|s| s.to_string().to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stopwords() {
        let filter = StopwordFilter::new("english");
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("and"));
        assert!(!filter.is_stopword("rocket"));
    }

    #[test]
    fn test_iso_code_accepted() {
        let filter = StopwordFilter::new("de");
        assert!(filter.is_stopword("und"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let filter = StopwordFilter::new("klingon");
        assert!(filter.is_stopword("the"));
    }

    #[test]
    fn test_custom_list() {
        let filter = StopwordFilter::from_list(&["Foo"]);
        assert!(filter.is_stopword("foo"));
        assert_eq!(filter.len(), 1);
        assert!(StopwordFilter::empty().is_empty());
    }
}
