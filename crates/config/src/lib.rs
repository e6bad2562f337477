//! Configuration loading, validation, and management for Nova.
//!
//! Loads configuration from `~/.nova/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use nova_core::SubjectMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.nova/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model provider ("gemini", "openai", "openrouter", "ollama", ...)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Chat history persistence
    #[serde(default)]
    pub history: HistoryConfig,

    /// Rate-limit retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Encyclopedia / search helpers
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Bot persona and session defaults
    #[serde(default)]
    pub bot: BotConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("history", &self.history)
            .field("retry", &self.retry)
            .field("lookup", &self.lookup)
            .field("bot", &self.bot)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding one `<session>.json` per conversation
    #[serde(default = "default_history_dir")]
    pub dir: PathBuf,

    /// Maximum turns kept per conversation
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("chat_history")
}
fn default_max_length() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
            max_length: default_max_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts allowed when the model is rate limited
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay; attempt `n` waits `n * delay_secs`
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

fn default_max_retries() -> u32 {
    2
}
fn default_delay_secs() -> u64 {
    5
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Wikipedia language edition
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_three")]
    pub encyclopedia_sentences: u32,

    #[serde(default = "default_three_usize")]
    pub web_results: usize,

    #[serde(default = "default_three_usize")]
    pub video_results: usize,

    /// Per-call timeout for every helper
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "en".into()
}
fn default_three() -> u32 {
    3
}
fn default_three_usize() -> usize {
    3
}
fn default_lookup_timeout() -> u64 {
    15
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            encyclopedia_sentences: default_three(),
            web_results: default_three_usize(),
            video_results: default_three_usize(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Subject mode for new sessions
    #[serde(default)]
    pub subject: SubjectMode,

    /// Start new sessions with simplified explanations
    #[serde(default)]
    pub eli5: bool,
}

fn default_bot_name() -> String {
    "Nova".into()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            subject: SubjectMode::default(),
            eli5: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `NOVA_CONFIG` or the default path
    /// (`~/.nova/config.toml`), then apply environment overrides.
    ///
    /// API key lookup order when the file has none:
    /// - `NOVA_API_KEY`
    /// - `GOOGLE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("NOVA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        Self::load_with_env(&path)
    }

    /// Load from `path`, then apply environment overrides and re-validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = var("NOVA_API_KEY").or_else(|| var("GOOGLE_API_KEY"));
        }

        if let Some(provider) = var("NOVA_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = var("NOVA_MODEL") {
            self.model = model;
        }

        if let Some(dir) = var("NOVA_HISTORY_DIR") {
            self.history.dir = PathBuf::from(dir);
        }

        if let Some(max) = var("NOVA_MAX_HISTORY") {
            self.history.max_length = max.parse().map_err(|_| {
                ConfigError::ValidationError(format!("NOVA_MAX_HISTORY must be a number, got '{max}'"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".nova")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.history.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "history.max_length must be at least 1".into(),
            ));
        }

        if self.retry.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_retries must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history: HistoryConfig::default(),
            retry: RetryConfig::default(),
            lookup: LookupConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
