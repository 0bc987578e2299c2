//! Embedding-similarity scoring: relevance is the cosine similarity between
//! the document embedding and each candidate embedding.

use super::candidates::token_runs;
use super::{ScoreRequest, ScoredPhrase, Scorer};
use crate::error::KteError;
use std::time::{Duration, Instant};

/// Turns texts into dense vectors.
pub trait Embedder: Send + Sync {
    /// Embed `texts`, returning one vector per input in the same order.
    fn embed(&self, texts: &[String], deadline: Option<Instant>) -> Result<Vec<Vec<f32>>, KteError>;

    fn name(&self) -> &str;
}

/// Scorer that ranks candidates by similarity to the whole document.
pub struct EmbeddingScorer<E: Embedder> {
    embedder: E,
    name: String,
}

impl<E: Embedder> EmbeddingScorer<E> {
    pub fn new(embedder: E) -> Self {
        let name = format!("embedding:{}", embedder.name());
        EmbeddingScorer { embedder, name }
    }
}

impl<E: Embedder> Scorer for EmbeddingScorer<E> {
    fn score(&self, request: &ScoreRequest<'_>) -> Result<Vec<ScoredPhrase>, KteError> {
        if request.expired() {
            return Err(KteError::timeout(Duration::ZERO));
        }
        if request.candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut inputs = Vec::with_capacity(request.candidates.len() + 1);
        inputs.push(request.text.to_string());
        inputs.extend(request.candidates.iter().cloned());

        let vectors = self.embedder.embed(&inputs, request.deadline)?;
        if vectors.len() != inputs.len() {
            return Err(KteError::backend(
                &self.name,
                format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    vectors.len()
                ),
            ));
        }

        let (doc, rest) = vectors.split_first().ok_or_else(|| {
            KteError::backend(&self.name, "backend returned no embeddings")
        })?;

        request
            .candidates
            .iter()
            .zip(rest)
            .map(|(phrase, v)| {
                let score = cosine(doc, v)
                    .ok_or_else(|| KteError::backend(&self.name, "embedding dimensions differ"))?;
                Ok(ScoredPhrase::new(phrase.clone(), score))
            })
            .collect()
    }

    fn backend_name(&self) -> &str {
        &self.name
    }
}

/// Cosine similarity; `None` when dimensions differ, 0.0 for zero vectors.
pub fn cosine(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return Some(0.0);
    }
    Some(dot / (na.sqrt() * nb.sqrt()))
}

/// Texts embedded between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 32;

/// Local embedder using signed feature hashing over words and character
/// trigrams. Deterministic and offline.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        HashingEmbedder::new(512)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        HashingEmbedder {
            dimension: dimension.max(8),
        }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for token in token_runs(text).into_iter().flatten() {
            self.add_feature(&mut v, "w", &token, 1.0);
            let padded: Vec<char> = format!("#{token}#").chars().collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                self.add_feature(&mut v, "c", &tri, 0.5);
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    fn add_feature(&self, v: &mut [f32], namespace: &str, feature: &str, weight: f32) {
        let h = fnv1a(namespace.as_bytes(), feature.as_bytes());
        let idx = (h % self.dimension as u64) as usize;
        let sign = if (h >> 63) & 1 == 1 { -1.0 } else { 1.0 };
        v[idx] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String], deadline: Option<Instant>) -> Result<Vec<Vec<f32>>, KteError> {
        let started = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(KteError::timeout(started.elapsed()));
            }
            out.push(self.embed_one(text));
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn fnv1a(namespace: &[u8], bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in namespace.iter().chain(b":").chain(bytes) {
        h ^= *b as u64;
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h
}
