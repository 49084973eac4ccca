//! Configuration loading for the Pulse dashboard.
//!
//! Read from the TOML file named by `--config <path>` or `PULSE_CONFIG`.
//! Without either, built-in defaults apply. Missing keys fall back to their
//! defaults; unknown keys are rejected.

use pulse_cache::CacheConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::theme::PulseTheme;

pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// UI tick: redraw cadence and search debounce resolution.
    pub refresh_interval_ms: u64,
    /// Background refetch of the selected user's details.
    pub user_poll_interval_ms: u64,
    pub log_path: PathBuf,
    pub search: SearchConfig,
    pub cache: CacheSettings,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    /// Terms shorter than this (in characters) never issue a search.
    pub min_chars: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheSettings {
    pub stale_time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: 10_000,
            refresh_interval_ms: 250,
            user_poll_interval_ms: 30_000,
            log_path: PathBuf::from("pulse.log"),
            search: SearchConfig::default(),
            cache: CacheSettings::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_chars: 2,
            debounce_ms: 300,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "pulse".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path_from_args().or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(invalid("refresh_interval_ms", "must be > 0"));
        }
        if self.user_poll_interval_ms == 0 {
            return Err(invalid("user_poll_interval_ms", "must be > 0"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        if self.search.min_chars == 0 {
            return Err(invalid("search.min_chars", "must be > 0"));
        }
        if self.cache.stale_time_ms == Some(0) {
            return Err(invalid("cache.stale_time_ms", "must be > 0 when set"));
        }
        if PulseTheme::by_name(&self.theme.name).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: format!("unknown theme '{}'", self.theme.name),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn user_poll_interval(&self) -> Duration {
        Duration::from_millis(self.user_poll_interval_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn cache_config(&self) -> CacheConfig {
        match self.cache.stale_time_ms {
            Some(ms) => CacheConfig::new().with_stale_time(Duration::from_millis(ms)),
            None => CacheConfig::new(),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("PULSE_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
