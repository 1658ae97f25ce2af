//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/chatpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/chatpulse/` (~/.config/chatpulse/)
//! - State/Logs: `$XDG_STATE_HOME/chatpulse/` (~/.local/state/chatpulse/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Upper bound accepted for `analytics.retention_days` (about a century).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Session aggregation and retention
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Knowledge-base matching
    #[serde(default)]
    pub faq: FaqConfig,

    /// External completion collaborator
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analytics and retention configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Days of buckets and feedback kept by retention pruning
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Popular-question keys are truncated to this many characters
    #[serde(default = "default_question_key_chars")]
    pub question_key_chars: usize,

    /// Maximum distinct popular-question counters kept after pruning
    #[serde(default = "default_max_popular_questions")]
    pub max_popular_questions: usize,

    /// Maximum feedback records held; the oldest are dropped first
    #[serde(default = "default_max_feedback_records")]
    pub max_feedback_records: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            question_key_chars: default_question_key_chars(),
            max_popular_questions: default_max_popular_questions(),
            max_feedback_records: default_max_feedback_records(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}

fn default_question_key_chars() -> usize {
    50
}

fn default_max_popular_questions() -> usize {
    1000
}

fn default_max_feedback_records() -> usize {
    10_000
}

/// Knowledge-base configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FaqConfig {
    /// Minimum partial-overlap score (0-100) accepted as a match
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,

    /// Custom knowledge base file; the built-in base is used when unset
    pub knowledge_base: Option<PathBuf>,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            knowledge_base: None,
        }
    }
}

fn default_min_confidence() -> u8 {
    40
}

/// Completion collaborator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    /// Seconds to wait for a completion before giving up
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_completion_timeout(),
        }
    }
}

fn default_completion_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        if self.faq.min_confidence > 100 {
            return Err(Error::Config(
                "faq.min_confidence must be between 0 and 100".to_string(),
            ));
        }
        if self.analytics.retention_days > MAX_RETENTION_DAYS {
            return Err(Error::Config(format!(
                "analytics.retention_days must be at most {}",
                MAX_RETENTION_DAYS
            )));
        }
        if self.analytics.question_key_chars == 0 {
            return Err(Error::Config(
                "analytics.question_key_chars must be at least 1".to_string(),
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(Error::Config(
                "completion.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/chatpulse/config.toml` (~/.config/chatpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("chatpulse").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/chatpulse/` (~/.local/state/chatpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("chatpulse")
    }

    /// Returns the directory holding the daily-rotated log files
    ///
    /// Files are named `chatpulse.<YYYY-MM-DD>.log`.
    pub fn log_dir() -> PathBuf {
        Self::state_dir()
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
