//! Structured logging to a file.
//!
//! The terminal belongs to the UI, so events go to `log_path` as JSON lines.
//! Filtering follows `PULSE_LOG` (EnvFilter syntax).

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TuiConfig;
use crate::error::TuiError;

pub const LOG_ENV: &str = "PULSE_LOG";
pub const DEFAULT_FILTER: &str = "pulse_tui=info,pulse_cache=debug,warn";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TuiError::Telemetry(format!("failed to install tracing subscriber: {e}")))?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        log_path = %config.log_path.display(),
        "Telemetry initialized"
    );
    Ok(())
}
