//! Remote embedding inference over HTTP.
//!
//! Supports three request/response dialects:
//! - `huggingface`: Inference API, bearer token required, body
//!   `{"inputs": [...], "options": {"wait_for_model": true}}`, response is a
//!   list of vectors.
//! - `stapi`: OpenAI-compatible `{"input": [...], "model": name}`, response
//!   `{"data": [{"embedding": [...]}, ...]}`.
//! - `infinity`: `{"input": [...]}`, same response shape as `stapi`.

use super::embedding::Embedder;
use crate::error::KteError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteEngine {
    HuggingFace,
    Stapi,
    Infinity,
}

impl fmt::Display for RemoteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteEngine::HuggingFace => write!(f, "huggingface"),
            RemoteEngine::Stapi => write!(f, "stapi"),
            RemoteEngine::Infinity => write!(f, "infinity"),
        }
    }
}

impl FromStr for RemoteEngine {
    type Err = KteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(RemoteEngine::HuggingFace),
            "stapi" | "openai" => Ok(RemoteEngine::Stapi),
            "infinity" => Ok(RemoteEngine::Infinity),
            other => Err(KteError::InvalidOptions(format!(
                "unknown engine '{other}' (expected local, huggingface, stapi or infinity)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    pub engine: RemoteEngine,
    pub api_url: String,
    pub auth_token: Option<String>,
    pub model_name: String,
    /// Per-request timeout; a caller deadline may shorten it.
    pub timeout: Duration,
    /// Texts per HTTP request.
    pub batch_size: usize,
}

/// Embedder that calls a remote inference endpoint.
pub struct HttpEmbedder {
    config: HttpEmbedderConfig,
    name: String,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, KteError> {
        let name = config.engine.to_string();
        if config.api_url.trim().is_empty() {
            return Err(KteError::backend(&name, "no API URL configured (set KTE_API_URL)"));
        }
        if config.engine == RemoteEngine::HuggingFace && config.auth_token.is_none() {
            return Err(KteError::backend(
                &name,
                "an auth token is required for the huggingface engine (set KTE_AUTH_TOKEN)",
            ));
        }
        Ok(HttpEmbedder { config, name })
    }

    fn request_body(&self, batch: &[String]) -> Value {
        match self.config.engine {
            RemoteEngine::HuggingFace => serde_json::json!({
                "inputs": batch,
                "options": { "wait_for_model": true },
            }),
            RemoteEngine::Stapi => serde_json::json!({
                "input": batch,
                "model": self.config.model_name,
            }),
            RemoteEngine::Infinity => serde_json::json!({ "input": batch }),
        }
    }

    fn parse_response(&self, body: &Value) -> Result<Vec<Vec<f32>>, KteError> {
        let items: Vec<&Value> = match self.config.engine {
            RemoteEngine::HuggingFace => body
                .as_array()
                .ok_or_else(|| self.malformed("expected a JSON array of embeddings"))?
                .iter()
                .collect(),
            RemoteEngine::Stapi | RemoteEngine::Infinity => body["data"]
                .as_array()
                .ok_or_else(|| self.malformed("missing 'data' array"))?
                .iter()
                .map(|item| &item["embedding"])
                .collect(),
        };

        items
            .into_iter()
            .map(|v| parse_vector(v).ok_or_else(|| self.malformed("embedding is not numeric")))
            .collect()
    }

    fn malformed(&self, reason: &str) -> KteError {
        KteError::backend(&self.name, format!("malformed response: {reason}"))
    }

    /// Per-request timeout: the configured timeout capped by the time left
    /// before the deadline.
    fn request_timeout(&self, deadline: Option<Instant>) -> Result<Duration, KteError> {
        match deadline {
            None => Ok(self.config.timeout),
            Some(d) => {
                let left = d.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Err(KteError::timeout(Duration::ZERO));
                }
                Ok(left.min(self.config.timeout))
            }
        }
    }

    fn post(&self, batch: &[String], timeout: Duration) -> Result<Value, KteError> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let body = serde_json::to_string(&self.request_body(batch))
            .map_err(|e| KteError::backend(&self.name, format!("JSON serialize error: {e}")))?;

        let mut request = agent
            .post(&self.config.api_url)
            .set("Content-Type", "application/json");
        if let Some(token) = &self.config.auth_token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let resp = request.send_string(&body).map_err(|e| {
            if is_timeout(&e) {
                KteError::timeout(timeout)
            } else {
                KteError::backend(&self.name, e.to_string())
            }
        })?;

        let text = resp
            .into_string()
            .map_err(|e| KteError::backend(&self.name, format!("failed to read response: {e}")))?;
        serde_json::from_str(&text).map_err(|e| self.malformed(&e.to_string()))
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, texts: &[String], deadline: Option<Instant>) -> Result<Vec<Vec<f32>>, KteError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let timeout = self.request_timeout(deadline)?;
            let started = Instant::now();
            let body = self.post(batch, timeout)?;
            let vectors = self.parse_response(&body)?;
            if vectors.len() != batch.len() {
                return Err(self.malformed(&format!(
                    "sent {} texts, received {} embeddings",
                    batch.len(),
                    vectors.len()
                )));
            }
            tracing::debug!(
                engine = %self.config.engine,
                batch = batch.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "embedding batch complete"
            );
            out.extend(vectors);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A flat numeric array, or a token-level matrix mean-pooled into one vector.
fn parse_vector(value: &Value) -> Option<Vec<f32>> {
    let arr = value.as_array()?;
    if arr.first().is_some_and(|v| v.is_array()) {
        let rows: Vec<Vec<f32>> = arr.iter().map(parse_vector).collect::<Option<_>>()?;
        return mean_pool(&rows);
    }
    arr.iter().map(|v| v.as_f64().map(|x| x as f32)).collect()
}

fn mean_pool(rows: &[Vec<f32>]) -> Option<Vec<f32>> {
    let dim = rows.first()?.len();
    if rows.iter().any(|r| r.len() != dim) {
        return None;
    }
    let mut acc = vec![0.0f32; dim];
    for row in rows {
        for (a, x) in acc.iter_mut().zip(row) {
            *a += x;
        }
    }
    let n = rows.len() as f32;
    Some(acc.into_iter().map(|a| a / n).collect())
}

fn is_timeout(err: &ureq::Error) -> bool {
    let ureq::Error::Transport(transport) = err else {
        return false;
    };
    let mut source = std::error::Error::source(transport);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = e.source();
    }
    transport.to_string().contains("timed out")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(engine: RemoteEngine) -> HttpEmbedderConfig {
        HttpEmbedderConfig {
            engine,
            api_url: "http://127.0.0.1:9/embed".into(),
            auth_token: Some("token".into()),
            model_name: "all-MiniLM-L6-v2".into(),
            timeout: Duration::from_secs(5),
            batch_size: 2,
        }
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("HF".parse::<RemoteEngine>().unwrap(), RemoteEngine::HuggingFace);
        assert_eq!("stapi".parse::<RemoteEngine>().unwrap(), RemoteEngine::Stapi);
        assert!("ollama".parse::<RemoteEngine>().is_err());
    }

    #[test]
    fn test_huggingface_requires_token() {
        let mut cfg = config(RemoteEngine::HuggingFace);
        cfg.auth_token = None;
        assert!(matches!(
            HttpEmbedder::new(cfg),
            Err(KteError::ScoringUnavailable(_))
        ));
    }

    #[test]
    fn test_request_bodies() {
        let batch = vec!["a".to_string()];
        let hf = HttpEmbedder::new(config(RemoteEngine::HuggingFace)).unwrap();
        assert_eq!(hf.request_body(&batch)["options"]["wait_for_model"], true);
        let st = HttpEmbedder::new(config(RemoteEngine::Stapi)).unwrap();
        assert_eq!(st.request_body(&batch)["model"], "all-MiniLM-L6-v2");
        let inf = HttpEmbedder::new(config(RemoteEngine::Infinity)).unwrap();
        assert!(inf.request_body(&batch).get("model").is_none());
    }

    #[test]
    fn test_parse_openai_style_response() {
        let e = HttpEmbedder::new(config(RemoteEngine::Stapi)).unwrap();
        let body = serde_json::json!({
            "data": [ { "embedding": [0.1, 0.2] }, { "embedding": [0.3, 0.4] } ]
        });
        let v = e.parse_response(&body).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[1], vec![0.3f32, 0.4f32]);
    }

    #[test]
    fn test_parse_huggingface_token_matrix_is_pooled() {
        let e = HttpEmbedder::new(config(RemoteEngine::HuggingFace)).unwrap();
        let body = serde_json::json!([ [[1.0, 3.0], [3.0, 5.0]] ]);
        let v = e.parse_response(&body).unwrap();
        assert_eq!(v, vec![vec![2.0f32, 4.0f32]]);
    }

    #[test]
    fn test_malformed_response_is_backend_error() {
        let e = HttpEmbedder::new(config(RemoteEngine::Infinity)).unwrap();
        let body = serde_json::json!({ "error": "overloaded" });
        assert!(matches!(
            e.parse_response(&body),
            Err(KteError::ScoringUnavailable(_))
        ));
    }

    #[test]
    fn test_expired_deadline_short_circuits() {
        let e = HttpEmbedder::new(config(RemoteEngine::Infinity)).unwrap();
        let err = e
            .embed(&["a".to_string()], Some(Instant::now()))
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
