//! Client configuration.
//!
//! # Responsibility
//! - Resolve the API base URL, local database path and logging options.
//!
//! # Invariants
//! - Sources merge as defaults, then the TOML file, then `NOTESYNC_*` env.
//! - A loaded config always has an `http(s)://` base URL.

use crate::logging::default_log_level;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `NOTESYNC_API_BASE_URL`.
pub const CONFIG_ENV_PREFIX: &str = "NOTESYNC_";
const DEFAULT_DB_FILE_NAME: &str = "notesync.sqlite3";

/// Runtime options for the notes client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ optional prefix) of the notes API.
    pub api_base_url: String,
    /// Local SQLite file holding the session token.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory; logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Extract(Box<figment::Error>),
    MissingBaseUrl,
    InvalidBaseUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extract(err) => write!(f, "invalid configuration: {err}"),
            Self::MissingBaseUrl => write!(
                f,
                "api_base_url is not set; use the config file or {CONFIG_ENV_PREFIX}API_BASE_URL"
            ),
            Self::InvalidBaseUrl(value) => {
                write!(f, "api_base_url must start with http:// or https://, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Extract(err) => Some(err.as_ref()),
            Self::MissingBaseUrl | Self::InvalidBaseUrl(_) => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Extract(Box::new(value))
    }
}

/// Builds the layered figment without extracting it.
pub fn config_figment(config_file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));
    if let Some(path) = config_file {
        figment = figment.merge(Toml::file_exact(path));
    }
    figment.merge(Env::prefixed(CONFIG_ENV_PREFIX))
}

/// Loads and validates configuration.
///
/// # Errors
/// - The explicit `config_file` is missing or malformed.
/// - `api_base_url` is empty or not an http(s) URL.
pub fn load_config(config_file: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let mut config: ClientConfig = config_figment(config_file).extract()?;
    config.api_base_url = config.api_base_url.trim().to_string();
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    let url = config.api_base_url.as_str();
    if url.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(url.to_string()));
    }
    Ok(())
}
