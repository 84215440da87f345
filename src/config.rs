//! Configuration loading for the saldo daemon.
//!
//! Configuration is a single JSON file. The path comes from the
//! `SALDO_CONFIG` environment variable, falling back to
//! `~/.saldo/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The config directory name under the home directory.
const CONFIG_DIR: &str = ".saldo";

/// The config file name.
const CONFIG_FILE: &str = "config.json";

/// Error raised while locating or reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory; set SALDO_CONFIG explicitly")]
    NoHomeDirectory,

    #[error("failed to read config from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config at {} is invalid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Mail relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP endpoint of the mail relay.
    pub endpoint: String,
    /// Bearer token authorizing sends through the relay.
    pub api_token: String,
    /// Sender address placed on every outgoing mail.
    pub from: String,
    /// Subject line used for every notification.
    #[serde(default = "default_subject")]
    pub subject: String,
}

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Public base URL of the web front end; confirmation links are built
    /// on top of it.
    pub public_url: String,
    /// Path of the durable snapshot file.
    pub storage_file: PathBuf,
    /// Seconds to wait between the end of one poll cycle and the start of
    /// the next.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Hours before an unconfirmed request expires.
    #[serde(default = "default_pending_ttl_hours")]
    pub pending_ttl_hours: i64,
    /// Base URL of the balance API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub mail: MailConfig,
}

fn default_poll_interval_secs() -> u64 {
    600
}

fn default_pending_ttl_hours() -> i64 {
    48
}

fn default_api_url() -> String {
    "https://api.kraken.com".to_string()
}

fn default_subject() -> String {
    "Saldo notification".to_string()
}

impl Config {
    /// Resolve the config path: `SALDO_CONFIG` or `~/.saldo/config.json`.
    pub fn resolve_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os("SALDO_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Load the configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.pending_ttl_hours)
    }
}
