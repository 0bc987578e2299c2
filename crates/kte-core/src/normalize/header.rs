use crate::model::HeaderKind;
use regex::Regex;
use std::sync::LazyLock;

/// Level given to headings found by the plain-text heuristics. Sits below
/// every explicit markdown/HTML level.
pub const PLAIN_HEADER_LEVEL: u8 = 7;

const MAX_CAPS_WORDS: usize = 5;
const MAX_TITLE_WORDS: usize = 8;

static ATX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap());
static SETEXT_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}=+\s*$").unwrap());
static SETEXT_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}-{3,}\s*$").unwrap());
pub(crate) static HTML_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").unwrap());

/// Words that stay lowercase inside a Title Case heading.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "the",
];

/// Parse an ATX heading (`## Title ##`), returning level and text.
pub fn parse_atx(line: &str) -> Option<(u8, &str)> {
    let caps = ATX.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = caps.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Level of a setext underline (`===` is 1, `---` is 2).
pub fn setext_level(line: &str) -> Option<u8> {
    if SETEXT_H1.is_match(line) {
        Some(1)
    } else if SETEXT_H2.is_match(line) {
        Some(2)
    } else {
        None
    }
}

pub fn contains_html_header(text: &str) -> bool {
    HTML_HEADER.is_match(text)
}

/// Whether a line reads like a plain-text heading on its own: a short
/// ALL-CAPS line or a Title Case line without sentence punctuation.
///
/// The caller checks that a blank line (or the end of input) follows.
pub fn looks_like_plain_heading(line: &str) -> Option<HeaderKind> {
    let line = line.trim();
    if line.is_empty() || !line.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    if line.ends_with(['.', ',', ';', ':', '!', '?']) {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() <= MAX_CAPS_WORDS && is_all_caps(line) {
        return Some(HeaderKind::Plain);
    }
    if words.len() <= MAX_TITLE_WORDS
        && line.chars().any(|c| c.is_lowercase())
        && is_title_case(&words)
    {
        return Some(HeaderKind::Plain);
    }
    None
}

fn is_all_caps(line: &str) -> bool {
    line.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
}

fn is_title_case(words: &[&str]) -> bool {
    let Some(first) = words.first().and_then(|w| w.chars().next()) else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }

    words[1..].iter().all(|word| {
        let Some(c) = word.chars().next() else {
            return true;
        };
        if !c.is_alphabetic() {
            return true;
        }
        if MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
            c.is_lowercase()
        } else {
            c.is_uppercase()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atx_levels() {
        assert_eq!(parse_atx("# Space Exploration"), Some((1, "Space Exploration")));
        assert_eq!(parse_atx("### Deep Dive ###"), Some((3, "Deep Dive")));
        assert_eq!(parse_atx("####### Too deep"), None);
        assert_eq!(parse_atx("#hashtag"), None);
        assert_eq!(parse_atx("#   "), None);
    }

    #[test]
    fn test_setext_levels() {
        assert_eq!(setext_level("====="), Some(1));
        assert_eq!(setext_level("---"), Some(2));
        assert_eq!(setext_level("--"), None);
        assert_eq!(setext_level("text"), None);
    }

    #[test]
    fn test_html_header_detection() {
        assert!(contains_html_header("<p>x</p><H2 class=\"t\">Orbit</h2>"));
        assert!(!contains_html_header("<p>no headings</p>"));
    }

    #[test]
    fn test_all_caps_heading() {
        assert_eq!(looks_like_plain_heading("CHAPTER ONE"), Some(HeaderKind::Plain));
        assert_eq!(
            looks_like_plain_heading("THIS LINE HAS FAR TOO MANY WORDS"),
            None
        );
    }

    #[test]
    fn test_title_case_heading() {
        assert!(looks_like_plain_heading("The History of Rocketry").is_some());
        assert!(looks_like_plain_heading("The history of rocketry").is_none());
        assert!(looks_like_plain_heading("Launch Windows And Orbits").is_none());
    }

    #[test]
    fn test_sentence_is_not_heading() {
        assert!(looks_like_plain_heading("Mars Is Red.").is_none());
        assert!(looks_like_plain_heading("2024").is_none());
    }
}
