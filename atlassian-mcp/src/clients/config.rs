//! Server configuration.
//!
//! Configuration is read from a JSON file when one is available, otherwise
//! from environment variables. The Atlassian base URL, email and API token
//! are mandatory; a missing value stops the server at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is missing from both the file and the environment.
    #[error("{what} is required in config or {env_var} environment variable")]
    MissingValue {
        /// Human readable name of the value.
        what: &'static str,
        /// Environment variable that supplies it.
        env_var: &'static str,
    },

    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Full server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Atlassian site and credentials.
    pub atlassian: AtlassianConfig,

    /// Server identity reported during `initialize`.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log every outgoing HTTP request.
    #[serde(default)]
    pub debug: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Atlassian site and credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlassianConfig {
    /// Site URL (e.g. "https://example.atlassian.net").
    #[serde(default)]
    pub base_url: String,

    /// Account email used for Basic auth.
    #[serde(default)]
    pub email: String,

    /// API token used for Basic auth.
    #[serde(default)]
    pub token: String,
}

impl fmt::Debug for AtlassianConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlassianConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Server identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "atlassian-server".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `ATLASSIAN_CONFIG_PATH`: config file (default: ./config/config.json)
    /// - `ATLASSIAN_BASE_URL`, `ATLASSIAN_EMAIL`, `ATLASSIAN_TOKEN`: credentials
    /// - `SERVER_NAME` (default: atlassian-server), `SERVER_VERSION` (default: 0.1.0)
    /// - `MCP_DEBUG`: "true" enables HTTP request logging
    /// - `ATLASSIAN_TIMEOUT_SECS`: request timeout (default: 30)
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ATLASSIAN_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, falling back to values supplied by `env`.
    pub fn load_with<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config file");
                config
            }
            Err(e) => {
                warn!(error = %e, "Config file unavailable, using environment variables");
                Self::from_env_with(&env)
            }
        };

        if let Some(debug) = env("MCP_DEBUG") {
            config.debug = debug == "true";
        }
        if let Some(secs) = env("ATLASSIAN_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.request_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_env_with<F>(env: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        Self {
            atlassian: AtlassianConfig {
                base_url: env("ATLASSIAN_BASE_URL").unwrap_or_default(),
                email: env("ATLASSIAN_EMAIL").unwrap_or_default(),
                token: env("ATLASSIAN_TOKEN").unwrap_or_default(),
            },
            server: ServerConfig {
                name: env("SERVER_NAME").unwrap_or(defaults.name),
                version: env("SERVER_VERSION").unwrap_or(defaults.version),
            },
            debug: false,
            request_timeout_secs: default_timeout_secs(),
        }
    }

    /// Reject configurations missing credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.atlassian.base_url.is_empty() {
            return Err(ConfigError::MissingValue {
                what: "Atlassian base URL",
                env_var: "ATLASSIAN_BASE_URL",
            });
        }
        if self.atlassian.email.is_empty() {
            return Err(ConfigError::MissingValue {
                what: "Atlassian email",
                env_var: "ATLASSIAN_EMAIL",
            });
        }
        if self.atlassian.token.is_empty() {
            return Err(ConfigError::MissingValue {
                what: "Atlassian token",
                env_var: "ATLASSIAN_TOKEN",
            });
        }
        Ok(())
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
