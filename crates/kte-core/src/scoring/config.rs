//! Scorer backend selection.

use super::embedding::{EmbeddingScorer, HashingEmbedder};
use super::remote::{HttpEmbedder, HttpEmbedderConfig, RemoteEngine};
use super::Scorer;
use crate::error::KteError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Which embedding engine backs the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// In-process feature-hashing embedder.
    #[default]
    Local,
    Remote(RemoteEngine),
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Local => write!(f, "local"),
            Engine::Remote(r) => write!(f, "{r}"),
        }
    }
}

impl FromStr for Engine {
    type Err = KteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "" => Ok(Engine::Local),
            other => other.parse().map(Engine::Remote),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub engine: Engine,
    pub api_url: Option<String>,
    pub auth_token: Option<String>,
    pub model_name: String,
    pub timeout: Duration,
    pub batch_size: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            engine: Engine::Local,
            api_url: None,
            auth_token: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ScorerConfig {
    /// Read `KTE_ENGINE`, `KTE_API_URL`, `KTE_AUTH_TOKEN`, `KTE_MODEL_NAME`
    /// and `KTE_TIMEOUT_SECS`, defaulting whatever is unset.
    pub fn from_env() -> Result<Self, KteError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KteError> {
        let mut config = ScorerConfig::default();
        if let Some(engine) = lookup("KTE_ENGINE") {
            config.engine = engine.parse()?;
        }
        config.api_url = lookup("KTE_API_URL").filter(|s| !s.trim().is_empty());
        config.auth_token = lookup("KTE_AUTH_TOKEN").filter(|s| !s.trim().is_empty());
        if let Some(model) = lookup("KTE_MODEL_NAME").filter(|s| !s.trim().is_empty()) {
            config.model_name = model;
        }
        if let Some(secs) = lookup("KTE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                KteError::InvalidOptions(format!("KTE_TIMEOUT_SECS must be an integer, got '{secs}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Construct the configured scorer. Remote engines are checked for a
    /// URL (and token, for huggingface) here, not on first use.
    pub fn build(&self) -> Result<Box<dyn Scorer>, KteError> {
        if self.timeout.is_zero() {
            return Err(KteError::InvalidOptions("timeout must be positive".into()));
        }
        match self.engine {
            Engine::Local => Ok(Box::new(EmbeddingScorer::new(HashingEmbedder::default()))),
            Engine::Remote(engine) => {
                let embedder = HttpEmbedder::new(HttpEmbedderConfig {
                    engine,
                    api_url: self.api_url.clone().unwrap_or_default(),
                    auth_token: self.auth_token.clone(),
                    model_name: self.model_name.clone(),
                    timeout: self.timeout,
                    batch_size: self.batch_size,
                })?;
                tracing::debug!(
                    engine = %engine,
                    model = %self.model_name,
                    timeout_secs = self.timeout.as_secs(),
                    "remote scorer configured"
                );
                Ok(Box::new(EmbeddingScorer::new(embedder)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_engine_parse() {
        assert_eq!("local".parse::<Engine>().unwrap(), Engine::Local);
        assert_eq!(
            "Infinity".parse::<Engine>().unwrap(),
            Engine::Remote(RemoteEngine::Infinity)
        );
        assert!("bert".parse::<Engine>().is_err());
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ScorerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.engine, Engine::Local);
        assert_eq!(config.model_name, DEFAULT_MODEL_NAME);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_values_applied() {
        let config = ScorerConfig::from_lookup(lookup(&[
            ("KTE_ENGINE", "stapi"),
            ("KTE_API_URL", "http://localhost:8080/v1/embeddings"),
            ("KTE_MODEL_NAME", "bge-small"),
            ("KTE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.engine, Engine::Remote(RemoteEngine::Stapi));
        assert_eq!(config.model_name, "bge-small");
        assert_eq!(config.timeout, Duration::from_secs(5));
        let scorer = config.build().unwrap();
        assert_eq!(scorer.backend_name(), "embedding:stapi");
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = ScorerConfig::from_lookup(lookup(&[("KTE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, KteError::InvalidOptions(_)));
    }

    #[test]
    fn test_remote_without_url_fails_at_build() {
        let config = ScorerConfig {
            engine: Engine::Remote(RemoteEngine::Infinity),
            ..ScorerConfig::default()
        };
        assert!(matches!(
            config.build(),
            Err(KteError::ScoringUnavailable(_))
        ));
    }

    #[test]
    fn test_local_build() {
        let scorer = ScorerConfig::default().build().unwrap();
        assert_eq!(scorer.backend_name(), "embedding:hashing");
    }
}
