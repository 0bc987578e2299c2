//! Inline markup stripping for body lines.

use regex::Regex;
use std::sync::LazyLock;

static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").unwrap());
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:>\s?)+").unwrap());
static THEMATIC_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*_]\s*){3,}$").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

const EMPHASIS: &[char] = &['*', '_', '~', '`'];
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')', '"', '\''];

/// Strip markdown inline syntax from a single body line.
pub fn strip_markdown_line(line: &str) -> String {
    if THEMATIC_BREAK.is_match(line) {
        return String::new();
    }
    let line = BLOCKQUOTE.replace(line, "");
    let line = LIST_MARKER.replace(&line, "");
    let line = IMAGE.replace_all(&line, "");
    let line = LINK.replace_all(&line, "$1");
    let line = HTML_TAG.replace_all(&line, " ");

    line.split_whitespace()
        .map(strip_emphasis)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove emphasis markers wrapped around a word, keeping trailing punctuation.
fn strip_emphasis(word: &str) -> String {
    let word = word.trim_start_matches(EMPHASIS);
    let body_end = word.trim_end_matches(TRAILING_PUNCT).len();
    let (body, punct) = word.split_at(body_end);
    let body = body.trim_end_matches(EMPHASIS);
    if body.is_empty() {
        return String::new();
    }
    format!("{body}{punct}")
}

/// Remove every tag and decode character entities.
pub fn strip_html(fragment: &str) -> String {
    let without_tags = HTML_TAG.replace_all(fragment, " ");
    decode_entities(&without_tags)
}

pub fn decode_entities(s: &str) -> String {
    let s = s.replace("&nbsp;", " ");
    match quick_xml::escape::unescape(&s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s,
    }
}

pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
