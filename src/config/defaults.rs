use mathsense_core::{SegmentationStrategy, Verbosity};

pub(crate) fn default_full_read_verbosity() -> Verbosity {
    Verbosity::Verbose
}

pub(crate) fn default_min_distinct_triggers() -> usize {
    mathsense_core::classifier::DEFAULT_MIN_DISTINCT_TRIGGERS
}

pub(crate) fn default_infer_mathml_complexity() -> bool {
    false
}

pub(crate) fn default_segmentation() -> SegmentationStrategy {
    SegmentationStrategy::SpokenText
}

pub(crate) fn default_pre_dispatch_delay_ms() -> u64 {
    120
}

pub(crate) fn default_min_read_secs() -> f32 {
    0.4
}

pub(crate) fn default_read_secs_per_char() -> f32 {
    0.04
}

pub(crate) fn default_children_changed_delay_ms() -> u64 {
    50
}

pub(crate) fn default_haptics_enabled() -> bool {
    true
}

pub(crate) fn default_haptic_enter() -> f32 {
    1.0
}

pub(crate) fn default_haptic_read() -> f32 {
    0.75
}

pub(crate) fn default_haptic_step() -> f32 {
    0.3
}

pub(crate) fn default_haptic_exit() -> f32 {
    0.5
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
