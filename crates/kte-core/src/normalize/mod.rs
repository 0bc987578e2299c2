pub mod header;
pub mod markup;

use crate::error::KteError;
use crate::model::{HeaderKind, HeaderSpan};
use header::{looks_like_plain_heading, parse_atx, setext_level, HTML_HEADER, PLAIN_HEADER_LEVEL};
use markup::{collapse_ws, strip_html, strip_markdown_line};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static HTML_BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(?:br|p|div|li|ul|ol|tr|table|section|article|blockquote|pre)\b[^>]*>")
        .unwrap()
});
static HTML_INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .unwrap()
});

/// Structural hint for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    /// Pick from the content: HTML headings, then markdown, then plain.
    #[default]
    Auto,
    Markdown,
    Html,
    Plain,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Auto => write!(f, "auto"),
            TextFormat::Markdown => write!(f, "markdown"),
            TextFormat::Html => write!(f, "html"),
            TextFormat::Plain => write!(f, "plain"),
        }
    }
}

/// Flat text stream plus the headers found in it, ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedText {
    pub text: String,
    pub headers: Vec<HeaderSpan>,
}

impl NormalizedText {
    /// Text covered by a header span.
    pub fn header_text(&self, span: &HeaderSpan) -> &str {
        &self.text[span.start..span.end]
    }
}

/// One logical line before assembly.
#[derive(Debug, Clone)]
struct Block {
    text: String,
    header: Option<(u8, HeaderKind)>,
}

impl Block {
    fn body(text: impl Into<String>) -> Self {
        Block {
            text: text.into(),
            header: None,
        }
    }

    fn header(text: impl Into<String>, level: u8, kind: HeaderKind) -> Self {
        Block {
            text: text.into(),
            header: Some((level, kind)),
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Normalize raw decoded text into a flat stream, recording header spans.
pub fn normalize(raw: &str, format: TextFormat) -> Result<NormalizedText, KteError> {
    if raw.trim().is_empty() {
        return Err(KteError::EmptyInput);
    }

    let blocks = match format {
        TextFormat::Html => html_blocks(raw),
        TextFormat::Markdown => markdown_blocks(raw),
        TextFormat::Plain => mark_plain_headings(raw.lines().map(Block::body).collect()),
        TextFormat::Auto => {
            if header::contains_html_header(raw) {
                html_blocks(raw)
            } else {
                let blocks = markdown_blocks(raw);
                if blocks.iter().any(|b| b.header.is_some()) {
                    blocks
                } else {
                    mark_plain_headings(blocks)
                }
            }
        }
    };

    let normalized = assemble(blocks);
    if normalized.text.is_empty() {
        return Err(KteError::EmptyInput);
    }
    Ok(normalized)
}

fn markdown_blocks(raw: &str) -> Vec<Block> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut blocks: Vec<Block> = Vec::with_capacity(lines.len());
    let mut in_fence = false;

    for line in lines {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            blocks.push(Block::body(line));
            continue;
        }

        if let Some((level, text)) = parse_atx(line) {
            blocks.push(Block::header(strip_markdown_line(text), level, HeaderKind::Markdown));
            continue;
        }

        if let Some(caps) = HTML_HEADER.captures(line) {
            if let (Some(whole), Some(level), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2))
            {
                let level: u8 = level.as_str().parse().unwrap_or(1);
                blocks.push(Block::body(strip_html(&line[..whole.start()])));
                blocks.push(Block::header(strip_html(inner.as_str()), level, HeaderKind::Html));
                blocks.push(Block::body(strip_html(&line[whole.end()..])));
                continue;
            }
        }

        // A setext underline turns the preceding paragraph line into a header.
        if let Some(level) = setext_level(line) {
            if let Some(prev) = blocks.last_mut() {
                if prev.header.is_none() && !prev.is_blank() {
                    prev.header = Some((level, HeaderKind::Setext));
                    continue;
                }
            }
        }

        blocks.push(Block::body(strip_markdown_line(line)));
    }

    blocks
}

fn html_blocks(raw: &str) -> Vec<Block> {
    let raw = HTML_INVISIBLE.replace_all(raw, " ");
    let mut blocks = Vec::new();
    let mut last = 0;

    for caps in HTML_HEADER.captures_iter(&raw) {
        let (Some(whole), Some(level), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        push_html_body(&raw[last..whole.start()], &mut blocks);
        let level: u8 = level.as_str().parse().unwrap_or(1);
        blocks.push(Block::body(""));
        blocks.push(Block::header(strip_html(inner.as_str()), level, HeaderKind::Html));
        blocks.push(Block::body(""));
        last = whole.end();
    }
    push_html_body(&raw[last..], &mut blocks);

    blocks
}

fn push_html_body(fragment: &str, blocks: &mut Vec<Block>) {
    let broken = HTML_BLOCK_BREAK.replace_all(fragment, "\n");
    for line in broken.lines() {
        blocks.push(Block::body(strip_html(line)));
    }
}

/// Promote short stand-alone lines to plain-text headers. A candidate line
/// must be followed by a blank line or the end of input.
fn mark_plain_headings(mut blocks: Vec<Block>) -> Vec<Block> {
    for i in 0..blocks.len() {
        if blocks[i].header.is_some() || blocks[i].is_blank() {
            continue;
        }
        let followed_by_break = blocks.get(i + 1).map(|b| b.is_blank()).unwrap_or(true);
        if !followed_by_break {
            continue;
        }
        if let Some(kind) = looks_like_plain_heading(&blocks[i].text) {
            blocks[i].header = Some((PLAIN_HEADER_LEVEL, kind));
        }
    }
    blocks
}

fn assemble(blocks: Vec<Block>) -> NormalizedText {
    let mut text = String::new();
    let mut headers = Vec::new();
    let mut pending_blank = false;

    for block in blocks {
        let line = collapse_ws(&block.text);
        if line.is_empty() {
            pending_blank = !text.is_empty();
            continue;
        }

        if !text.is_empty() {
            text.push('\n');
            if pending_blank {
                text.push('\n');
            }
        }
        pending_blank = false;

        let start = text.len();
        text.push_str(&line);
        if let Some((level, kind)) = block.header {
            headers.push(HeaderSpan {
                start,
                end: text.len(),
                level,
                text: line,
                kind,
            });
        }
    }

    NormalizedText { text, headers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_header_span() {
        let n = normalize(
            "# Space Exploration\nHumans have long dreamed of space exploration and Mars colonization.",
            TextFormat::Auto,
        )
        .unwrap();
        assert_eq!(n.headers.len(), 1);
        let h = &n.headers[0];
        assert_eq!(h.level, 1);
        assert_eq!(h.kind, HeaderKind::Markdown);
        assert_eq!(n.header_text(h), "Space Exploration");
        assert!(n.text.starts_with("Space Exploration\nHumans"));
    }

    #[test]
    fn test_levels_follow_hash_count() {
        let n = normalize("# One\n\n## Two\n\n###### Six\nbody", TextFormat::Markdown).unwrap();
        let levels: Vec<u8> = n.headers.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 6]);
    }

    #[test]
    fn test_setext_headers() {
        let n = normalize("Mission Log\n===========\n\nFuel\n----\nbody text", TextFormat::Markdown)
            .unwrap();
        assert_eq!(n.headers.len(), 2);
        assert_eq!(n.headers[0].level, 1);
        assert_eq!(n.headers[0].kind, HeaderKind::Setext);
        assert_eq!(n.headers[1].text, "Fuel");
        assert_eq!(n.headers[1].level, 2);
        assert!(!n.text.contains("==="));
    }

    #[test]
    fn test_html_headers() {
        let n = normalize(
            "<h1>Orbital <em>Mechanics</em></h1><p>Kepler &amp; Newton.</p><h3>Transfers</h3>",
            TextFormat::Auto,
        )
        .unwrap();
        assert_eq!(n.headers.len(), 2);
        assert_eq!(n.headers[0].text, "Orbital Mechanics");
        assert_eq!(n.headers[0].level, 1);
        assert_eq!(n.headers[1].level, 3);
        assert!(n.text.contains("Kepler & Newton."));
        assert!(!n.text.contains('<'));
    }

    #[test]
    fn test_html_header_inside_markdown() {
        let n = normalize(
            "<h2>Solar Sails</h2>\n\nLight pushes solar sails.\n\n# Ion Drives\nslow thrust",
            TextFormat::Markdown,
        )
        .unwrap();
        assert_eq!(n.headers.len(), 2);
        assert_eq!(n.headers[0].text, "Solar Sails");
        assert_eq!(n.headers[0].level, 2);
        assert_eq!(n.headers[0].kind, HeaderKind::Html);
        assert_eq!(n.headers[1].kind, HeaderKind::Markdown);
        assert!(!n.text.contains('<'));
        for h in &n.headers {
            assert_eq!(n.header_text(h), h.text);
        }
    }

    #[test]
    fn test_plain_heading_heuristics() {
        let text = "INTRODUCTION\n\nRockets burn fuel.\n\nThe Red Planet\n\nMars is cold.";
        let n = normalize(text, TextFormat::Plain).unwrap();
        let texts: Vec<&str> = n.headers.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["INTRODUCTION", "The Red Planet"]);
        assert!(n.headers.iter().all(|h| h.level == PLAIN_HEADER_LEVEL));
    }

    #[test]
    fn test_plain_heading_requires_following_break() {
        let n = normalize("The Red Planet\nMars is cold.", TextFormat::Plain).unwrap();
        assert!(n.headers.is_empty());
    }

    #[test]
    fn test_auto_skips_heuristics_when_explicit_headers_exist() {
        let n = normalize("# Real Header\n\nSTANDALONE CAPS\n\nbody.", TextFormat::Auto).unwrap();
        assert_eq!(n.headers.len(), 1);
        assert_eq!(n.headers[0].text, "Real Header");
    }

    #[test]
    fn test_blank_runs_collapse() {
        let n = normalize("alpha   beta\n\n\n\ngamma", TextFormat::Plain).unwrap();
        assert_eq!(n.text, "alpha beta\n\ngamma");
    }

    #[test]
    fn test_spans_cover_header_text() {
        let n = normalize("intro line\n\n## Fuel Cells\nmore text", TextFormat::Auto).unwrap();
        for h in &n.headers {
            assert_eq!(&n.text[h.start..h.end], h.text);
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(normalize("", TextFormat::Auto), Err(KteError::EmptyInput)));
        assert!(matches!(normalize(" \n\t ", TextFormat::Plain), Err(KteError::EmptyInput)));
    }

    #[test]
    fn test_markup_only_input_is_empty() {
        assert!(matches!(
            normalize("<p></p><br/>", TextFormat::Html),
            Err(KteError::EmptyInput)
        ));
    }
}
