//! Final selection of keywords from weighted candidates.

use crate::model::Candidate;
use crate::options::ExtractionOptions;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Deduplicate, threshold, sort, interleave and truncate.
///
/// Deterministic: equal scores fall back to phrase preference and then to
/// discovery order, so identical inputs always rank identically.
pub fn rank(candidates: Vec<Candidate>, options: &ExtractionOptions) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = dedup(candidates)
        .into_iter()
        .filter(|c| c.score() >= options.min_relevance)
        .collect();

    kept.sort_by(|a, b| compare(a, b, options.prefer_phrases));

    let mut ranked = if options.prefer_phrases {
        interleave(kept)
    } else {
        kept
    };
    ranked.truncate(options.max_keywords);
    ranked
}

/// Keep one candidate per normalized surface form: the higher score, or the
/// earlier discovery on a tie.
fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match index.get(&candidate.key()) {
            Some(&i) => {
                let existing = &out[i];
                let better = candidate.score() > existing.score()
                    || (candidate.score() == existing.score() && candidate.order() < existing.order());
                if better {
                    out[i] = candidate;
                }
            }
            None => {
                index.insert(candidate.key(), out.len());
                out.push(candidate);
            }
        }
    }
    out
}

fn compare(a: &Candidate, b: &Candidate, prefer_phrases: bool) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| {
            if prefer_phrases {
                b.is_phrase().cmp(&a.is_phrase())
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.order().cmp(&b.order()))
}

/// Alternate phrases and single words, phrase first, each list keeping its
/// sorted order. A single-kind input is returned unchanged.
fn interleave(sorted: Vec<Candidate>) -> Vec<Candidate> {
    let (phrases, words): (Vec<Candidate>, Vec<Candidate>) =
        sorted.into_iter().partition(|c| c.is_phrase());
    if phrases.is_empty() || words.is_empty() {
        return if phrases.is_empty() { words } else { phrases };
    }

    let mut out = Vec::with_capacity(phrases.len() + words.len());
    let mut p = phrases.into_iter();
    let mut w = words.into_iter();
    loop {
        match (p.next(), w.next()) {
            (Some(a), Some(b)) => {
                out.push(a);
                out.push(b);
            }
            (Some(a), None) => {
                out.push(a);
                out.extend(p);
                break;
            }
            (None, Some(b)) => {
                out.push(b);
                out.extend(w);
                break;
            }
            (None, None) => break,
        }
    }
    out
}
