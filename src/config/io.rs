use super::models::EngineConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> EngineConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded engine config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default engine config: {err}"
            );
            return EngineConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed engine configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid engine config TOML: {err:#}");
            EngineConfig::default()
        }
    }
}

/// Parse sectioned TOML into a sanitized config.
pub fn parse_config(contents: &str) -> Result<EngineConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Parsing engine config TOML")?;
    Ok(EngineConfig::from(tables).sanitized())
}

pub fn serialize_config(config: &EngineConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Serializing engine config")
}
