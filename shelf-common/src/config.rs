//! Configuration loading and data folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error. A malformed one is logged and
//! ignored so the service still starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "SHELF_DATA_FOLDER";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "SHELF_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a built-in default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Base URL of the remote recommendation API
    pub api_base_url: String,

    /// HTTP port of the local dashboard backend
    pub port: u16,

    /// Folder holding persisted preferences
    pub data_folder: Option<PathBuf>,

    /// Freshness window of the API response cache
    pub cache_ttl_secs: u64,

    /// Per-request timeout against the remote API
    pub request_timeout_secs: u64,

    /// Upper bound on a single list-processing request
    pub worker_timeout_ms: u64,

    /// Quiet period before preferences are written to disk
    pub prefs_debounce_ms: u64,

    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            port: 5830,
            data_folder: None,
            cache_ttl_secs: 300,
            request_timeout_secs: 10,
            worker_timeout_ms: 5000,
            prefs_debounce_ms: 500,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from the first config file found, falling back to defaults
    ///
    /// `explicit` (from the command line) wins over [`CONFIG_FILE_ENV`],
    /// which wins over the platform search path.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let (config, warning) = Self::load(explicit);
        if let Some(warning) = warning {
            warn!("{}", warning);
        }
        config
    }

    /// Same lookup as [`TomlConfig::load_or_default`], but an unusable file is
    /// handed back as a message instead of logged
    ///
    /// For callers that read config before logging is set up.
    pub fn load(explicit: Option<&Path>) -> (Self, Option<String>) {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from))
            .or_else(|| find_config_file().ok());

        let Some(path) = path else {
            return (Self::default(), None);
        };

        match Self::from_file(&path) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("Ignoring config file {}: {}", path.display(), e)),
            ),
        }
    }
}

/// Data folder resolution following the priority order above
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Locate the config file for the platform
fn find_config_file() -> Result<PathBuf> {
    // Try ~/.config/shelf/config.toml first, then /etc/shelf/config.toml
    let user_config = dirs::config_dir().map(|d| d.join("shelf").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/shelf/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("shelf"))
        .unwrap_or_else(|| PathBuf::from("./shelf_data"))
}
