//! Diagnostic logging setup. Interaction telemetry goes through
//! [`crate::host::InteractionLog`] instead.

use crate::config::LogLevel;
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

pub type LogReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing() -> Result<LogReloadHandle> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .try_init()
        .context("Installing tracing subscriber")?;
    info!("Logging initialized; override level with [logging] log_level or RUST_LOG");
    Ok(handle)
}

pub fn set_log_level(handle: &LogReloadHandle, level: LogLevel) {
    let parsed = filter_for(level);
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .parse(level.as_filter_str())
        .unwrap_or_else(|_| EnvFilter::new("debug"))
}
