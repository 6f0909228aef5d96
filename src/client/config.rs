//! Client configuration and API key resolution.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::error::{ChunkerError, Result};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "CHONKIE_API_KEY";

/// Language hint sent to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Language {
    /// Let the service detect the language.
    #[default]
    Auto,
    /// A language identifier understood by the service (e.g. `"python"`).
    Named(String),
}

impl Language {
    pub fn as_str(&self) -> &str {
        match self {
            Language::Auto => "auto",
            Language::Named(name) => name,
        }
    }
}

impl From<&str> for Language {
    fn from(value: &str) -> Self {
        if value == "auto" {
            Language::Auto
        } else {
            Language::Named(value.to_string())
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        if value == "auto" {
            Language::Auto
        } else {
            Language::Named(value)
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// User-facing configuration for a [`CodeChunker`](super::CodeChunker).
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Tokenizer or token counter the service measures chunks with.
    pub tokenizer_or_token_counter: String,

    /// Upper bound on tokens per chunk.
    pub chunk_size: usize,

    /// Language of the submitted code.
    pub language: Language,

    /// Explicit API key. Falls back to [`API_KEY_ENV`] when unset or empty.
    pub api_key: Option<String>,

    /// Base URL of the service.
    pub base_url: String,

    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl ChunkerConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.chonkie.ai";

    pub const DEFAULT_TOKENIZER: &'static str = "gpt2";

    pub const DEFAULT_CHUNK_SIZE: usize = 512;

    pub fn new() -> Self {
        Self {
            tokenizer_or_token_counter: Self::DEFAULT_TOKENIZER.to_string(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            language: Language::Auto,
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn tokenizer_or_token_counter(mut self, tokenizer: impl Into<String>) -> Self {
        self.tokenizer_or_token_counter = tokenizer.into();
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn language(mut self, language: impl Into<Language>) -> Self {
        self.language = language.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ClientSettings> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve using `env` for environment lookups.
    pub fn resolve_with<F>(self, env: F) -> Result<ClientSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(self.api_key.as_deref(), env)?;

        if self.chunk_size == 0 {
            return Err(ChunkerError::Configuration(
                "Chunk size must be greater than 0".to_string(),
            ));
        }

        Ok(ClientSettings {
            tokenizer_or_token_counter: self.tokenizer_or_token_counter,
            chunk_size: self.chunk_size,
            language: self.language,
            api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated configuration captured by a connected client.
///
/// Only obtainable through [`ChunkerConfig::resolve`] or
/// [`ChunkerConfig::resolve_with`], so the key is non-empty and the chunk
/// size positive.
#[derive(Clone)]
pub struct ClientSettings {
    pub(crate) tokenizer_or_token_counter: String,
    pub(crate) chunk_size: usize,
    pub(crate) language: Language,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Option<Duration>,
}

// Keeps the key out of logs and panic messages.
impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("tokenizer_or_token_counter", &self.tokenizer_or_token_counter)
            .field("chunk_size", &self.chunk_size)
            .field("language", &self.language)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Pick the explicit key if it is non-empty, otherwise ask `env` for
/// [`API_KEY_ENV`].
pub fn resolve_api_key<F>(explicit: Option<&str>, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    env(API_KEY_ENV).filter(|k| !k.is_empty()).ok_or_else(|| {
        ChunkerError::Configuration(format!(
            "No API key provided. Set the {API_KEY_ENV} environment variable or pass an API key explicitly"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_config_defaults() {
        let config = ChunkerConfig::default();
        assert_eq!(config.tokenizer_or_token_counter, "gpt2");
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.language, Language::Auto);
        assert_eq!(config.base_url, ChunkerConfig::DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ChunkerConfig::new()
            .tokenizer_or_token_counter("cl100k_base")
            .chunk_size(256)
            .language("rust")
            .api_key("key")
            .base_url("http://localhost:8000/")
            .timeout(Duration::from_secs(5));

        let settings = config.resolve_with(no_env).unwrap();
        assert_eq!(settings.tokenizer_or_token_counter, "cl100k_base");
        assert_eq!(settings.chunk_size, 256);
        assert_eq!(settings.language, Language::Named("rust".to_string()));
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.base_url, "http://localhost:8000");
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = ChunkerConfig::new().api_key("key").chunk_size(0).resolve_with(no_env);
        assert!(matches!(result, Err(ChunkerError::Configuration(_))));
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        let key = resolve_api_key(Some("explicit"), |_| Some("from-env".to_string())).unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_env_key_used_when_explicit_missing_or_empty() {
        let env = |name: &str| (name == API_KEY_ENV).then(|| "from-env".to_string());
        assert_eq!(resolve_api_key(None, env).unwrap(), "from-env");
        assert_eq!(resolve_api_key(Some(""), env).unwrap(), "from-env");
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(matches!(
            resolve_api_key(None, no_env),
            Err(ChunkerError::Configuration(_))
        ));
        assert!(matches!(
            resolve_api_key(Some(""), |_| Some(String::new())),
            Err(ChunkerError::Configuration(_))
        ));

        let result = ChunkerConfig::new().resolve_with(no_env);
        assert!(matches!(result, Err(ChunkerError::Configuration(_))));
    }

    #[test]
    fn test_language_conversions() {
        assert_eq!(Language::from("auto"), Language::Auto);
        assert_eq!(Language::from("python").as_str(), "python");
        assert_eq!(Language::from("go".to_string()).to_string(), "go");
        assert_eq!(serde_json::to_string(&Language::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = ChunkerConfig::new()
            .api_key("super-secret")
            .resolve_with(no_env)
            .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
