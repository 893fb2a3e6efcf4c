//! Platform collaborators the engine talks to but does not own.
//!
//! Every call is fire-and-forget: failures are logged at debug level and the
//! engine carries on as if the channel were absent.

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Opaque handle the host uses to identify the equation's accessibility node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementRef(pub u64);

pub trait AccessibilityHost: Send + Sync {
    fn is_assistive_tech_active(&self) -> bool;
    fn announce(&self, text: &str) -> Result<()>;
    fn notify_navigable_children_changed(&self, element: ElementRef) -> Result<()>;
}

pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str) -> Result<()>;
}

pub trait HapticEngine: Send + Sync {
    /// `intensity` is in `0.0..=1.0`.
    fn pulse(&self, intensity: f32) -> Result<()>;
}

pub trait InteractionLog: Send + Sync {
    fn log_interaction(&self, kind: &str, label: &str, extra: Value);
}

/// Collaborator that accepts everything and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl AccessibilityHost for Noop {
    fn is_assistive_tech_active(&self) -> bool {
        false
    }

    fn announce(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn notify_navigable_children_changed(&self, _element: ElementRef) -> Result<()> {
        Ok(())
    }
}

impl SpeechSynthesizer for Noop {
    fn speak(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

impl HapticEngine for Noop {
    fn pulse(&self, _intensity: f32) -> Result<()> {
        Ok(())
    }
}

impl InteractionLog for Noop {
    fn log_interaction(&self, _kind: &str, _label: &str, _extra: Value) {}
}

/// The full set of collaborators for one element.
#[derive(Clone)]
pub struct Collaborators {
    pub accessibility: Arc<dyn AccessibilityHost>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub haptics: Arc<dyn HapticEngine>,
    pub interactions: Arc<dyn InteractionLog>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            accessibility: Arc::new(Noop),
            speech: Arc::new(Noop),
            haptics: Arc::new(Noop),
            interactions: Arc::new(Noop),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Routes to the screen reader when one is running, otherwise to speech.
    pub fn speak_or_announce(&self, text: &str) {
        let assistive = self.accessibility.is_assistive_tech_active();
        let result = if assistive {
            self.accessibility.announce(text)
        } else {
            self.speech.speak(text)
        };
        match result {
            Ok(()) => debug!(assistive, chars = text.chars().count(), "Dispatched announcement"),
            Err(err) => debug!(assistive, "Announcement channel unavailable: {err:#}"),
        }
    }

    pub fn pulse(&self, intensity: f32) {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if let Err(err) = self.haptics.pulse(intensity) {
            debug!(intensity, "Haptic channel unavailable: {err:#}");
        }
    }

    pub fn notify_children_changed(&self, element: ElementRef) {
        if let Err(err) = self.accessibility.notify_navigable_children_changed(element) {
            debug!(element = element.0, "Focus channel unavailable: {err:#}");
        }
    }

    pub fn log_interaction(&self, kind: &str, label: &str, extra: Value) {
        self.interactions.log_interaction(kind, label, extra);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{HostCall, RecordingHost};
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn routes_to_screen_reader_only_when_active() {
        let host = Arc::new(RecordingHost::default());
        let collaborators = host.collaborators();
        collaborators.speak_or_announce("one");
        host.assistive.store(true, Ordering::SeqCst);
        collaborators.speak_or_announce("two");
        assert_eq!(
            host.calls(),
            vec![
                HostCall::Speak("one".to_string()),
                HostCall::Announce("two".to_string())
            ]
        );
    }

    #[test]
    fn haptic_failures_are_swallowed_and_intensity_clamped() {
        let host = Arc::new(RecordingHost::default());
        let collaborators = host.collaborators();
        collaborators.pulse(3.0);
        collaborators.pulse(f32::NAN);
        assert_eq!(host.pulses(), vec![1.0, 0.0]);

        host.fail_haptics.store(true, Ordering::SeqCst);
        collaborators.pulse(0.5);
        assert_eq!(host.pulses().len(), 2);
    }

    #[test]
    fn noop_collaborators_accept_everything() {
        let collaborators = Collaborators::default();
        collaborators.speak_or_announce("anything");
        collaborators.pulse(1.0);
        collaborators.notify_children_changed(ElementRef(7));
        collaborators.log_interaction("gesture", "activate", Value::Null);
    }
}
