//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NettoolsError, Result};
use crate::workbook::CompressionLevel;

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE: &str = "NETTOOLS_API_BASE";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "NETTOOLS_TIMEOUT_SECS";

/// Settings for talking to the processing API and writing reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the processing API, without a trailing slash.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Compression used for exported reports.
    pub compression: CompressionLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            compression: CompressionLevel::Default,
        }
    }
}

impl Config {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        Config::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load a TOML file; missing keys keep their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            NettoolsError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| NettoolsError::Config(format!("invalid config: {}", e)))?;
        config.normalized()
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`Config::from_env`]).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                NettoolsError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        self.normalized()
    }

    /// Replace the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self> {
        self.api_base = api_base.into();
        self.normalized()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn normalized(mut self) -> Result<Self> {
        self.api_base = self.api_base.trim().trim_end_matches('/').to_string();
        if self.api_base.is_empty() {
            return Err(NettoolsError::Config("api_base must not be empty".to_string()));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(NettoolsError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.timeout_secs == 0 {
            return Err(NettoolsError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(self)
    }
}
