//! Runtime configuration.
//!
//! A single [`AppConfig`] is assembled once at startup and handed to each
//! component. Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config`)
//! 3. Environment variables (`.env` is loaded first if present)
//! 4. Command-line flags
//!
//! # Example `config.yaml`
//!
//! ```yaml
//! llm:
//!   api_base: https://api.openai.com/v1
//!   model: gpt-3.5-turbo
//!   max_retries: 2
//! http:
//!   timeout_secs: 10
//! pacing:
//!   batch_delay_secs: 2
//!   concurrency: 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_MODEL: &str = "NEWS_SUMMARIZER_MODEL";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("an API key is required; set {ENV_API_KEY} or pass --api-key")]
    MissingApiKey,
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// LLM endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub api_base: String,
    pub model: String,
    /// Never read from the YAML file's output side; keep secrets out of logs.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            max_retries: 2,
        }
    }
}

/// Page and feed fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Politeness settings for multi-item runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause between items of a URL batch or feed.
    pub batch_delay_secs: u64,
    /// Pause between URLs in a parse-only batch.
    pub parse_delay_secs: u64,
    /// Items in flight at once; 1 means strictly sequential.
    pub concurrency: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            batch_delay_secs: 2,
            parse_delay_secs: 1,
            concurrency: 1,
        }
    }
}

impl PacingConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }

    pub fn parse_delay(&self) -> Duration {
        Duration::from_secs(self.parse_delay_secs)
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub http: HttpConfig,
    pub pacing: PacingConfig,
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub concurrency: Option<usize>,
}

impl AppConfig {
    /// Load from an optional YAML file, then apply environment and CLI overrides.
    #[instrument(level = "info", skip(overrides))]
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        info!(
            model = %config.llm.model,
            api_base = %config.llm.api_base,
            concurrency = config.pacing.concurrency,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&raw)?;
        debug!(path = %path.display(), "Read config file");
        Ok(config)
    }

    /// Apply environment variables through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.llm.api_base = base;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(key) = overrides.api_key.filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.pacing.concurrency = concurrency;
        }
    }

    /// Range checks only; the API key is checked where it is needed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pacing.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// The configured API key, required for any LLM call.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}
