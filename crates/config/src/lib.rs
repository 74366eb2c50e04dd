//! Configuration loading and validation for clawtrail.
//!
//! Loads configuration from `~/.clawtrail/config.toml` (or an explicit path)
//! with environment variable overrides for secrets and identities. The
//! config is built once at startup and passed by reference to every
//! component; a missing or invalid file is the only fatal error in the
//! pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Discord REST API base used when `api_base` is not set.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// The root configuration structure.
///
/// Maps directly to `~/.clawtrail/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Bot token used for every Discord call
    #[serde(default)]
    pub discord_token: String,

    /// Channel that receives summaries and forwarded messages
    #[serde(default)]
    pub audit_channel_id: String,

    /// User ID of the agent whose outgoing messages are mirrored
    #[serde(default)]
    pub bot_user_id: String,

    /// Source channels polled by `clawtrail forward`, in polling order
    #[serde(default)]
    pub watch_channels: Vec<String>,

    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Messages fetched per channel per cycle
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Forwarded IDs remembered before the oldest are evicted
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Where forwarded message IDs are persisted
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// REST API base URL (overridable for proxies and tests)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    3
}
fn default_fetch_limit() -> usize {
    10
}
fn default_dedup_capacity() -> usize {
    500
}
fn default_state_file() -> PathBuf {
    AuditConfig::config_dir().join("forwarded.json")
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}
fn default_request_timeout() -> u64 {
    10
}

impl std::fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.discord_token.is_empty() {
            "None"
        } else {
            "[REDACTED]"
        };
        f.debug_struct("AuditConfig")
            .field("discord_token", &token)
            .field("audit_channel_id", &self.audit_channel_id)
            .field("bot_user_id", &self.bot_user_id)
            .field("watch_channels", &self.watch_channels)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("fetch_limit", &self.fetch_limit)
            .field("dedup_capacity", &self.dedup_capacity)
            .field("state_file", &self.state_file)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AuditConfig {
    /// Load configuration from `path`, or from `~/.clawtrail/config.toml`
    /// when no path is given, then apply environment overrides:
    /// - `CLAWTRAIL_DISCORD_TOKEN`
    /// - `CLAWTRAIL_AUDIT_CHANNEL`
    /// - `CLAWTRAIL_BOT_USER_ID`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.state_file = expand_home(&config.state_file);
        config.validate()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty("CLAWTRAIL_DISCORD_TOKEN") {
            self.discord_token = token;
        }
        if let Some(channel) = non_empty("CLAWTRAIL_AUDIT_CHANNEL") {
            self.audit_channel_id = channel;
        }
        if let Some(user) = non_empty("CLAWTRAIL_BOT_USER_ID") {
            self.bot_user_id = user;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".clawtrail")
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Settings every command needs.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be at least 1".into(),
            ));
        }

        if !(1..=100).contains(&self.fetch_limit) {
            return Err(ConfigError::ValidationError(
                "fetch_limit must be between 1 and 100".into(),
            ));
        }

        if self.dedup_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "dedup_capacity must be at least 1".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Settings `clawtrail format` needs on top of [`Self::validate`].
    pub fn validate_for_format(&self) -> Result<(), ConfigError> {
        self.validate()?;
        require("discord_token", &self.discord_token)?;
        require("audit_channel_id", &self.audit_channel_id)
    }

    /// Settings `clawtrail forward` needs on top of [`Self::validate_for_format`].
    pub fn validate_for_forward(&self) -> Result<(), ConfigError> {
        self.validate_for_format()?;
        require("bot_user_id", &self.bot_user_id)?;
        if self.watch_channels.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "watch_channels must list at least one channel".into(),
            ));
        }
        // Every id inside one cycle's fetch window must stay remembered, or
        // evicted ids are forwarded again on the next cycle.
        let window = self.fetch_limit.saturating_mul(self.watch_channels.len());
        if self.dedup_capacity < window {
            return Err(ConfigError::ValidationError(format!(
                "dedup_capacity ({}) must be at least fetch_limit x watch_channels ({window})",
                self.dedup_capacity
            )));
        }
        Ok(())
    }

    /// A filled-in example config (for `clawtrail init`).
    pub fn sample_toml() -> String {
        let sample = Self {
            discord_token: "YOUR_BOT_TOKEN".into(),
            audit_channel_id: "000000000000000000".into(),
            bot_user_id: "000000000000000000".into(),
            watch_channels: vec!["000000000000000000".into()],
            ..Self::default()
        };
        toml::to_string_pretty(&sample).unwrap_or_default()
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            audit_channel_id: String::new(),
            bot_user_id: String::new(),
            watch_channels: vec![],
            poll_interval_secs: default_poll_interval(),
            fetch_limit: default_fetch_limit(),
            dedup_capacity: default_dedup_capacity(),
            state_file: default_state_file(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(key.into()));
    }
    Ok(())
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs_home().join(rest),
        Err(_) => path.to_path_buf(),
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
    #[error("Config file not found at {path}; run `clawtrail init` to create one")]
    NotFound { path: PathBuf },

    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
