//! Engine configuration.
//!
//! Tunables for speech, classification, segmentation, announcement pacing,
//! accessibility notifications and haptics live here. They load from a TOML
//! file split into sections; missing or invalid entries fall back to defaults
//! so an equation can always be presented.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{EngineConfig, LogLevel};
