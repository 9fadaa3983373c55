//! Configuration file support.
//!
//! Settings are stored as versioned, pretty-printed JSON. Which file is used
//! is decided by [`ConfigSource::select`]:
//!
//! 1. an explicit `--config-path`,
//! 2. the built-in defaults when `--shipped-configs` is given (read-only),
//! 3. the user file under the platform config directory,
//! 4. the built-in defaults when no user file exists.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LAST_FILE_TOKEN, DEFAULT_LOOKUP_TIMEOUT_SECS,
    DEFAULT_SESSION_FILE, DEFAULT_STAGING_PREFIX,
};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    #[default]
    Warn,
    /// Show errors, warnings, and info messages
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Lowercase name, as written in the config file.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = LogLevel::all().iter().map(LogLevel::name).collect();
                format!("expected one of {}", names.join(", "))
            })
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Resolver section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Connect and read timeout per lookup, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip the network; every lookup degrades to a warning
    #[serde(default)]
    pub offline: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            offline: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Prefix of staging side files
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,

    /// Token standing for the last touched document
    #[serde(default = "default_last_file_token")]
    pub last_file_token: String,

    /// Session file recording the last touched document
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Remote lookup settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_staging_prefix() -> String {
    DEFAULT_STAGING_PREFIX.to_string()
}

fn default_last_file_token() -> String {
    DEFAULT_LAST_FILE_TOKEN.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

impl NotesConfig {
    /// Keys accepted by [`get`](Self::get), [`set`](Self::set) and [`reset`](Self::reset).
    pub const KEYS: &'static [&'static str] = &[
        "staging_prefix",
        "last_file_token",
        "session_file",
        "resolver.timeout_secs",
        "resolver.offline",
        "log_level",
    ];

    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            staging_prefix: default_staging_prefix(),
            last_file_token: default_last_file_token(),
            session_file: default_session_file(),
            resolver: ResolverConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default user config file path.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join(CONFIG_DIR_NAME)
                    .join(CONFIG_FILE_NAME)
            })
        }
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Current value of `key` as text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "staging_prefix" => self.staging_prefix.clone(),
            "last_file_token" => self.last_file_token.clone(),
            "session_file" => self.session_file.display().to_string(),
            "resolver.timeout_secs" => self.resolver.timeout_secs.to_string(),
            "resolver.offline" => self.resolver.offline.to_string(),
            "log_level" => self.log_level.name().to_string(),
            _ => return Err(ConfigError::unknown_key(key)),
        };
        Ok(value)
    }

    /// Set `key` from its text form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "staging_prefix" | "last_file_token" => {
                if value.trim().is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                if key == "staging_prefix" {
                    self.staging_prefix = value.to_string();
                } else {
                    self.last_file_token = value.to_string();
                }
            }
            "session_file" => {
                if value.trim().is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                self.session_file = PathBuf::from(value);
            }
            "resolver.timeout_secs" => {
                let secs: u64 = value.trim().parse().map_err(|e| invalid(format!("{e}")))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                self.resolver.timeout_secs = secs;
            }
            "resolver.offline" => {
                self.resolver.offline = value.trim().parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "log_level" => self.log_level = value.parse().map_err(invalid)?,
            _ => return Err(ConfigError::unknown_key(key)),
        }
        Ok(())
    }

    /// Restore `key` to its default value.
    pub fn reset(&mut self, key: &str) -> Result<(), ConfigError> {
        let defaults = Self::new();
        let value = defaults.get(key)?;
        self.set(key, &value)
    }

    /// Every key with its current value, in [`KEYS`](Self::KEYS) order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where configuration is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// File named with `--config-path`.
    Explicit(PathBuf),
    /// Built-in defaults; read-only.
    Shipped,
    /// The per-user file, which may not exist yet.
    User(PathBuf),
}

impl ConfigSource {
    /// Apply the precedence rules to the command-line options.
    pub fn select(config_path: Option<&Path>, shipped: bool) -> Self {
        if let Some(path) = config_path {
            return ConfigSource::Explicit(path.to_path_buf());
        }
        if shipped {
            return ConfigSource::Shipped;
        }
        match NotesConfig::default_path() {
            Some(path) => ConfigSource::User(path),
            None => {
                log::warn!("Could not determine a config directory; using built-in defaults");
                ConfigSource::Shipped
            }
        }
    }

    /// Load the configuration from this source.
    ///
    /// A broken user file is reported and replaced by the defaults; a broken
    /// explicit file is an error.
    pub fn load(&self) -> Result<NotesConfig, ConfigError> {
        match self {
            ConfigSource::Explicit(path) => NotesConfig::load(path),
            ConfigSource::Shipped => Ok(NotesConfig::new()),
            ConfigSource::User(path) => match NotesConfig::load(path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    log::warn!("Failed to read config file {:?}: {}", path, e);
                    Ok(NotesConfig::new())
                }
            },
        }
    }

    /// Persist `config` to this source.
    pub fn save(&self, config: &NotesConfig) -> Result<(), ConfigError> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::User(path) => config.save(path),
            ConfigSource::Shipped => Err(ConfigError::ReadOnly),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::User(path) => {
                write!(f, "{}", path.display())
            }
            ConfigSource::Shipped => write!(f, "built-in defaults"),
        }
    }
}

/// Errors that can occur when loading or changing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Key is not a configuration setting
    #[error("unknown configuration key '{key}' (known keys: {known})")]
    UnknownKey { key: String, known: String },

    /// Value cannot be parsed for this key
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Attempt to change the built-in defaults
    #[error("built-in configuration is read-only; use --config-path or the user config")]
    ReadOnly,
}

impl ConfigError {
    fn unknown_key(key: &str) -> Self {
        Self::UnknownKey {
            key: key.to_string(),
            known: NotesConfig::KEYS.join(", "),
        }
    }

    /// Whether the error stems from the request rather than the file.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ConfigError::UnknownKey { .. } | ConfigError::InvalidValue { .. } | ConfigError::ReadOnly
        )
    }
}
