use mathsense_core::{SegmentationStrategy, Verbosity};
use serde::Deserialize;
use std::time::Duration;

/// Flat engine configuration; the on-disk form is sectioned (see `tables`).
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "crate::config::defaults::default_full_read_verbosity")]
    pub full_read_verbosity: Verbosity,
    #[serde(default = "crate::config::defaults::default_min_distinct_triggers")]
    pub min_distinct_triggers: usize,
    #[serde(default = "crate::config::defaults::default_infer_mathml_complexity")]
    pub infer_mathml_complexity: bool,
    #[serde(default = "crate::config::defaults::default_segmentation")]
    pub segmentation: SegmentationStrategy,
    #[serde(default = "crate::config::defaults::default_pre_dispatch_delay_ms")]
    pub pre_dispatch_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_min_read_secs")]
    pub min_read_secs: f32,
    #[serde(default = "crate::config::defaults::default_read_secs_per_char")]
    pub read_secs_per_char: f32,
    #[serde(default = "crate::config::defaults::default_children_changed_delay_ms")]
    pub children_changed_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_haptics_enabled")]
    pub haptics_enabled: bool,
    #[serde(default = "crate::config::defaults::default_haptic_enter")]
    pub haptic_enter: f32,
    #[serde(default = "crate::config::defaults::default_haptic_read")]
    pub haptic_read: f32,
    #[serde(default = "crate::config::defaults::default_haptic_step")]
    pub haptic_step: f32,
    #[serde(default = "crate::config::defaults::default_haptic_exit")]
    pub haptic_exit: f32,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            full_read_verbosity: crate::config::defaults::default_full_read_verbosity(),
            min_distinct_triggers: crate::config::defaults::default_min_distinct_triggers(),
            infer_mathml_complexity: crate::config::defaults::default_infer_mathml_complexity(),
            segmentation: crate::config::defaults::default_segmentation(),
            pre_dispatch_delay_ms: crate::config::defaults::default_pre_dispatch_delay_ms(),
            min_read_secs: crate::config::defaults::default_min_read_secs(),
            read_secs_per_char: crate::config::defaults::default_read_secs_per_char(),
            children_changed_delay_ms: crate::config::defaults::default_children_changed_delay_ms(),
            haptics_enabled: crate::config::defaults::default_haptics_enabled(),
            haptic_enter: crate::config::defaults::default_haptic_enter(),
            haptic_read: crate::config::defaults::default_haptic_read(),
            haptic_step: crate::config::defaults::default_haptic_step(),
            haptic_exit: crate::config::defaults::default_haptic_exit(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Clamps values into ranges the engine can honor.
    pub fn sanitized(mut self) -> Self {
        self.min_distinct_triggers = self
            .min_distinct_triggers
            .clamp(1, mathsense_core::classifier::COMPLEXITY_TRIGGERS.len());
        self.pre_dispatch_delay_ms = self.pre_dispatch_delay_ms.min(2_000);
        self.min_read_secs = finite_or(self.min_read_secs, 0.4).clamp(0.0, 10.0);
        self.read_secs_per_char = finite_or(self.read_secs_per_char, 0.04).clamp(0.0, 1.0);
        self.children_changed_delay_ms = self.children_changed_delay_ms.min(1_000);
        self.haptic_enter = finite_or(self.haptic_enter, 1.0).clamp(0.0, 1.0);
        self.haptic_read = finite_or(self.haptic_read, 0.75).clamp(0.0, 1.0);
        self.haptic_step = finite_or(self.haptic_step, 0.3).clamp(0.0, 1.0);
        self.haptic_exit = finite_or(self.haptic_exit, 0.5).clamp(0.0, 1.0);
        self
    }

    pub fn pre_dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.pre_dispatch_delay_ms)
    }

    pub fn min_read(&self) -> Duration {
        seconds_or(self.min_read_secs, Duration::from_millis(400))
    }

    pub fn read_per_char(&self) -> Duration {
        seconds_or(self.read_secs_per_char, Duration::from_millis(40))
    }

    pub fn children_changed_delay(&self) -> Duration {
        Duration::from_millis(self.children_changed_delay_ms)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn seconds_or(secs: f32, fallback: Duration) -> Duration {
    if !secs.is_finite() {
        return fallback;
    }
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or(fallback)
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrepresentable_read_times_fall_back_to_defaults() {
        let config = EngineConfig {
            min_read_secs: f32::INFINITY,
            read_secs_per_char: f32::NAN,
            ..EngineConfig::default()
        };
        assert_eq!(config.min_read(), Duration::from_millis(400));
        assert_eq!(config.read_per_char(), Duration::from_millis(40));

        let huge = EngineConfig {
            min_read_secs: f32::MAX,
            read_secs_per_char: -1.0,
            ..EngineConfig::default()
        };
        assert_eq!(huge.min_read(), Duration::from_millis(400));
        assert_eq!(huge.read_per_char(), Duration::ZERO);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let config = EngineConfig {
            min_read_secs: f32::INFINITY,
            haptic_enter: 7.0,
            pre_dispatch_delay_ms: u64::MAX,
            ..EngineConfig::default()
        }
        .sanitized();
        assert!((config.min_read_secs - 0.4).abs() < f32::EPSILON);
        assert!((config.haptic_enter - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.pre_dispatch_delay_ms, 2_000);
    }
}
