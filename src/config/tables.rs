use super::defaults;
use super::models::{EngineConfig, LogLevel};
use mathsense_core::{SegmentationStrategy, Verbosity};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    speech: SpeechConfig,
    #[serde(default)]
    classifier: ClassifierConfig,
    #[serde(default)]
    segmentation: SegmentationConfig,
    #[serde(default)]
    announcements: AnnouncementConfig,
    #[serde(default)]
    accessibility: AccessibilityConfig,
    #[serde(default)]
    haptics: HapticsConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for EngineConfig {
    fn from(tables: ConfigTables) -> Self {
        EngineConfig {
            full_read_verbosity: tables.speech.full_read_verbosity,
            min_distinct_triggers: tables.classifier.min_distinct_triggers,
            infer_mathml_complexity: tables.classifier.infer_mathml_complexity,
            segmentation: tables.segmentation.strategy,
            pre_dispatch_delay_ms: tables.announcements.pre_dispatch_delay_ms,
            min_read_secs: tables.announcements.min_read_secs,
            read_secs_per_char: tables.announcements.read_secs_per_char,
            children_changed_delay_ms: tables.accessibility.children_changed_delay_ms,
            haptics_enabled: tables.haptics.enabled,
            haptic_enter: tables.haptics.enter,
            haptic_read: tables.haptics.read,
            haptic_step: tables.haptics.step,
            haptic_exit: tables.haptics.exit,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&EngineConfig> for ConfigTables {
    fn from(config: &EngineConfig) -> Self {
        ConfigTables {
            speech: SpeechConfig {
                full_read_verbosity: config.full_read_verbosity,
            },
            classifier: ClassifierConfig {
                min_distinct_triggers: config.min_distinct_triggers,
                infer_mathml_complexity: config.infer_mathml_complexity,
            },
            segmentation: SegmentationConfig {
                strategy: config.segmentation,
            },
            announcements: AnnouncementConfig {
                pre_dispatch_delay_ms: config.pre_dispatch_delay_ms,
                min_read_secs: config.min_read_secs,
                read_secs_per_char: config.read_secs_per_char,
            },
            accessibility: AccessibilityConfig {
                children_changed_delay_ms: config.children_changed_delay_ms,
            },
            haptics: HapticsConfig {
                enabled: config.haptics_enabled,
                enter: config.haptic_enter,
                read: config.haptic_read,
                step: config.haptic_step,
                exit: config.haptic_exit,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SpeechConfig {
    #[serde(default = "defaults::default_full_read_verbosity")]
    full_read_verbosity: Verbosity,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            full_read_verbosity: defaults::default_full_read_verbosity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ClassifierConfig {
    #[serde(default = "defaults::default_min_distinct_triggers")]
    min_distinct_triggers: usize,
    #[serde(default = "defaults::default_infer_mathml_complexity")]
    infer_mathml_complexity: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            min_distinct_triggers: defaults::default_min_distinct_triggers(),
            infer_mathml_complexity: defaults::default_infer_mathml_complexity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SegmentationConfig {
    #[serde(default = "defaults::default_segmentation")]
    strategy: SegmentationStrategy,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig {
            strategy: defaults::default_segmentation(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AnnouncementConfig {
    #[serde(default = "defaults::default_pre_dispatch_delay_ms")]
    pre_dispatch_delay_ms: u64,
    #[serde(default = "defaults::default_min_read_secs")]
    min_read_secs: f32,
    #[serde(default = "defaults::default_read_secs_per_char")]
    read_secs_per_char: f32,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        AnnouncementConfig {
            pre_dispatch_delay_ms: defaults::default_pre_dispatch_delay_ms(),
            min_read_secs: defaults::default_min_read_secs(),
            read_secs_per_char: defaults::default_read_secs_per_char(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AccessibilityConfig {
    #[serde(default = "defaults::default_children_changed_delay_ms")]
    children_changed_delay_ms: u64,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        AccessibilityConfig {
            children_changed_delay_ms: defaults::default_children_changed_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct HapticsConfig {
    #[serde(default = "defaults::default_haptics_enabled")]
    enabled: bool,
    #[serde(default = "defaults::default_haptic_enter")]
    enter: f32,
    #[serde(default = "defaults::default_haptic_read")]
    read: f32,
    #[serde(default = "defaults::default_haptic_step")]
    step: f32,
    #[serde(default = "defaults::default_haptic_exit")]
    exit: f32,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        HapticsConfig {
            enabled: defaults::default_haptics_enabled(),
            enter: defaults::default_haptic_enter(),
            read: defaults::default_haptic_read(),
            step: defaults::default_haptic_step(),
            exit: defaults::default_haptic_exit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
