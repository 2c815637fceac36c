//! Configuration loading and persistence.
//!
//! Process-wide settings that are not per-project: where group links point,
//! which endpoint notifications are posted to, the request timeout, and
//! where per-project options are stored.
//!
//! # Environment Variables
//!
//! - `SENTRY_PUSHOVER_CONFIG_DIR` - config directory override
//! - `SENTRY_PUSHOVER_URL_PREFIX` - web UI URL prefix for links
//! - `SENTRY_PUSHOVER_API_URL` - message-submission endpoint
//! - `SENTRY_PUSHOVER_TIMEOUT` - request timeout in seconds
//! - `SENTRY_PUSHOVER_OPTIONS` - per-project options file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use std::{fs, path::PathBuf};

use crate::constants;

/// Smallest accepted request timeout.
const MIN_TIMEOUT_SECS: u64 = 1;

/// Configuration for the Pushover dispatcher.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// URL prefix of the web UI, without trailing slash.
    pub url_prefix: String,
    /// Pushover message-submission endpoint.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// File holding per-project options. Defaults to `projects.json` in the config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_prefix: constants::DEFAULT_URL_PREFIX.to_string(),
            api_url: constants::PUSHOVER_MESSAGES_URL.to_string(),
            timeout_secs: constants::HTTP_REQUEST_TIMEOUT.as_secs(),
            options_path: None,
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Uses `SENTRY_PUSHOVER_CONFIG_DIR` when set, otherwise the platform
    /// config directory (e.g. `~/.config/sentry-pushover` on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(dir) = std::env::var("SENTRY_PUSHOVER_CONFIG_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("sentry-pushover")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Path of `config.json` inside [`Config::config_dir`].
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing config file yields the defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides();
        config.normalize();
        Ok(config)
    }

    /// Loads configuration from `path` without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url_prefix) = std::env::var("SENTRY_PUSHOVER_URL_PREFIX") {
            self.url_prefix = url_prefix;
        }

        if let Ok(api_url) = std::env::var("SENTRY_PUSHOVER_API_URL") {
            self.api_url = api_url;
        }

        if let Ok(timeout) = std::env::var("SENTRY_PUSHOVER_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => log::warn!(
                    target: constants::LOG_TARGET,
                    "Ignoring SENTRY_PUSHOVER_TIMEOUT={:?}: expected a positive number of seconds",
                    timeout
                ),
            }
        }

        if let Ok(options_path) = std::env::var("SENTRY_PUSHOVER_OPTIONS") {
            self.options_path = Some(PathBuf::from(options_path));
        }
    }

    /// Trims trailing slashes off the URL prefix and raises a zero timeout
    /// to one second.
    pub fn normalize(&mut self) {
        let trimmed = self.url_prefix.trim_end_matches('/').len();
        self.url_prefix.truncate(trimmed);
        self.timeout_secs = self.timeout_secs.max(MIN_TIMEOUT_SECS);
    }

    /// Writes this configuration to [`Config::config_path`], readable by the
    /// owner only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
        Ok(path)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolves the per-project options file.
    pub fn options_file(&self) -> Result<PathBuf> {
        match self.options_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("projects.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.url_prefix, "http://localhost:9000");
        assert_eq!(config.api_url, "https://api.pushover.net/1/messages.json");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.options_path.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"url_prefix": "https://sentry.example.com/"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.url_prefix, "https://sentry.example.com");
        assert_eq!(config.api_url, constants::PUSHOVER_MESSAGES_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_timeout_is_raised() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"timeout_secs": 0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_normalize_keeps_positive_timeout() {
        let mut config = Config {
            url_prefix: "https://sentry.example.com//".to_string(),
            timeout_secs: 30,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.url_prefix, "https://sentry.example.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_serialization_skips_unset_options_path() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("options_path"));
    }
}
