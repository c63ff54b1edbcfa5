//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Placeholder shipped in template configuration files.
pub const PLACEHOLDER: &str = "CHANGE_ME";

const DEFAULT_API_URL: &str = "https://api.binance.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Binance API key (`API_KEY`).
    pub api_key: Option<String>,
    /// Binance API secret (`API_SECRET`).
    pub api_secret: Option<String>,
    /// REST endpoint, overridable with `BINANCE_API_URL`.
    pub api_url: String,
    /// HTTP request timeout
    pub timeout: Duration,
    /// `recvWindow` sent with signed requests, in milliseconds.
    pub recv_window_ms: u64,
}

/// API credentials validated as usable for signed requests.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// Shape of the optional JSON configuration file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            api_url: DEFAULT_API_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, an optional JSON file and the environment.
    ///
    /// Environment variables win over the file; the `.env` file never overrides
    /// variables that are already set.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match config_file {
            Some(path) => Self::read_file(path)?,
            None => FileConfig::default(),
        };

        let timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!(
                    "HTTP_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: env_non_empty("API_KEY").or(file.api_key),
            api_secret: env_non_empty("API_SECRET").or(file.api_secret),
            api_url: env_non_empty("BINANCE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            timeout: Duration::from_secs(timeout_secs),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
        })
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("can't read config file {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("{} is not a valid config JSON file: {e}", path.display()))
        })
    }

    /// Credentials for signed endpoints.
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            api_key: check_set("API_KEY", self.api_key.as_deref())?,
            api_secret: check_set("API_SECRET", self.api_secret.as_deref())?,
        })
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn check_set(name: &str, value: Option<&str>) -> Result<String> {
    match value {
        None => Err(AppError::Config(format!("{name} is not set"))),
        Some(PLACEHOLDER) => Err(AppError::Config(format!(
            "{name} still holds the {PLACEHOLDER} placeholder, please change it"
        ))),
        Some(v) => Ok(v.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn credentials_reject_missing_and_placeholder_values() {
        let mut config = AppConfig::default();
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("API_KEY"));

        config.api_key = Some("key".into());
        config.api_secret = Some(PLACEHOLDER.into());
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("API_SECRET"));
        assert!(err.to_string().contains(PLACEHOLDER));

        config.api_secret = Some("secret".into());
        let creds = config.credentials().unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret, "secret");
    }

    #[test]
    fn reads_json_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"api_key": "abc", "api_secret": "def"}"#).unwrap();
        let parsed = AppConfig::read_file(file.path()).unwrap();
        assert_eq!(parsed.api_key.as_deref(), Some("abc"));
        assert_eq!(parsed.api_secret.as_deref(), Some("def"));
    }

    #[test]
    fn invalid_json_config_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = AppConfig::read_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
