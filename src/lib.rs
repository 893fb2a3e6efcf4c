//! Math-to-speech and math-exploration engine for accessible worksheets.
//!
//! [`mathsense_core`] turns markup into spoken text and navigable parts.
//! This crate adds the stateful side: math-mode navigation, paced
//! announcements, platform collaborators and a single-owner runtime.

pub mod announcer;
pub mod config;
pub mod element;
pub mod host;
pub mod navigation;
pub mod runtime;
pub mod telemetry;
pub mod timers;

pub use announcer::{Announcement, AnnouncementPacing, AnnouncementQueue};
pub use config::{EngineConfig, LogLevel, load_config, parse_config, serialize_config};
pub use element::{
    ElementCommand, ElementEvent, EquationElement, EquationSnapshot, Presentation,
};
pub use host::{
    AccessibilityHost, Collaborators, ElementRef, HapticEngine, InteractionLog, Noop,
    SpeechSynthesizer,
};
pub use mathsense_core::{MathContent, Part, Verbosity};
pub use navigation::{Gesture, NavigationMode, NavigationState};
pub use runtime::{EquationHandle, EquationRuntime};
pub use telemetry::{LogReloadHandle, init_tracing, set_log_level};
pub use timers::{TimerId, TimerQueue};
