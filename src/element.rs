//! One mounted equation: derived analysis, navigation, announcement pacing
//! and the timers behind them. Single-owner; see [`crate::runtime`] for
//! cross-thread access.

use crate::announcer::{AnnouncementPacing, AnnouncementQueue, AnnouncerTimer};
use crate::config::EngineConfig;
use crate::host::{Collaborators, ElementRef};
use crate::navigation::{
    Gesture, HapticCue, NavigationAction, NavigationMode, NavigationState, transition,
};
use crate::timers::{TimerId, TimerQueue};
use mathsense_core::{
    AnalysisOptions, ComplexityClassifier, EquationAnalysis, MathContent, Part, analyze,
};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, trace};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTimer {
    AnnouncementDispatch,
    AnnouncementReadComplete,
    ChildrenChanged,
}

impl From<AnnouncerTimer> for ElementTimer {
    fn from(timer: AnnouncerTimer) -> Self {
        match timer {
            AnnouncerTimer::Dispatch => ElementTimer::AnnouncementDispatch,
            AnnouncerTimer::ReadComplete => ElementTimer::AnnouncementReadComplete,
        }
    }
}

/// How the equation is offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Presentation {
    /// Spoken in one go; no math mode.
    Inline,
    MathMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCommand {
    Activate,
    RotorNext,
    RotorPrevious,
    Escape,
    GetSnapshot,
    UpdateContent { content: MathContent },
}

impl ElementCommand {
    pub fn action(&self) -> &'static str {
        match self {
            ElementCommand::Activate => "activate",
            ElementCommand::RotorNext => "rotor_next",
            ElementCommand::RotorPrevious => "rotor_previous",
            ElementCommand::Escape => "escape",
            ElementCommand::GetSnapshot => "get_snapshot",
            ElementCommand::UpdateContent { .. } => "update_content",
        }
    }

    fn gesture(&self) -> Option<Gesture> {
        match self {
            ElementCommand::Activate => Some(Gesture::Activate),
            ElementCommand::RotorNext => Some(Gesture::RotorNext),
            ElementCommand::RotorPrevious => Some(Gesture::RotorPrevious),
            ElementCommand::Escape => Some(Gesture::Escape),
            ElementCommand::GetSnapshot | ElementCommand::UpdateContent { .. } => None,
        }
    }
}

/// What the host renders and exposes to the accessibility tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct EquationSnapshot {
    pub label: String,
    pub hint: String,
    pub mode: NavigationMode,
    pub current_part_index: usize,
    pub parts: Vec<Part>,
    pub presentation: Presentation,
    pub substantial: bool,
    pub spoken_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementEvent {
    pub action: &'static str,
    /// False when the command should fall through to outer navigation.
    pub consumed: bool,
    pub snapshot: EquationSnapshot,
}

#[derive(Debug)]
pub struct EquationElement {
    element: ElementRef,
    config: EngineConfig,
    collaborators: Collaborators,
    analysis: EquationAnalysis,
    presentation: Presentation,
    navigation: NavigationState,
    announcer: AnnouncementQueue,
    timers: TimerQueue<ElementTimer>,
    children_changed: Option<TimerId>,
    mounted: bool,
}

impl EquationElement {
    pub fn mount(
        element: ElementRef,
        content: &MathContent,
        config: EngineConfig,
        collaborators: Collaborators,
    ) -> Self {
        let config = config.sanitized();
        let analysis = analyze(content, &analysis_options(&config));
        let presentation = presentation_for(&analysis);
        let navigation = NavigationState::new(analysis.parts().to_vec());
        let announcer = AnnouncementQueue::new(AnnouncementPacing::from_config(&config));
        info!(
            element = element.0,
            ?presentation,
            parts = navigation.parts().len(),
            "Mounted equation element"
        );
        Self {
            element,
            config,
            collaborators,
            analysis,
            presentation,
            navigation,
            announcer,
            timers: TimerQueue::new(),
            children_changed: None,
            mounted: true,
        }
    }

    pub fn element_ref(&self) -> ElementRef {
        self.element
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn analysis(&self) -> &EquationAnalysis {
        &self.analysis
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn pending_announcements(&self) -> Vec<String> {
        self.announcer.pending().map(str::to_string).collect()
    }

    /// Re-derives everything when the content fingerprint changed. Returns
    /// whether anything was replaced.
    pub fn update_content(&mut self, content: &MathContent) -> bool {
        if !self.mounted || content.fingerprint() == self.analysis.fingerprint() {
            return false;
        }
        let was_math_mode = self.navigation.is_math_mode();
        self.analysis = analyze(content, &analysis_options(&self.config));
        self.presentation = presentation_for(&self.analysis);
        self.navigation.replace_parts(self.analysis.parts().to_vec());
        self.announcer.clear(&mut self.timers);
        if was_math_mode {
            self.schedule_children_changed();
        }
        info!(
            element = self.element.0,
            presentation = ?self.presentation,
            parts = self.navigation.parts().len(),
            "Equation content changed"
        );
        true
    }

    pub fn apply_command(&mut self, command: ElementCommand) -> ElementEvent {
        let action = command.action();
        let consumed = match (&command, command.gesture()) {
            (_, Some(gesture)) => self.handle_gesture(gesture),
            (ElementCommand::UpdateContent { content }, None) => self.update_content(content),
            _ => false,
        };
        ElementEvent {
            action,
            consumed,
            snapshot: self.snapshot(),
        }
    }

    pub fn activate(&mut self) -> bool {
        self.handle_gesture(Gesture::Activate)
    }

    pub fn rotor_next(&mut self) -> bool {
        self.handle_gesture(Gesture::RotorNext)
    }

    pub fn rotor_previous(&mut self) -> bool {
        self.handle_gesture(Gesture::RotorPrevious)
    }

    pub fn escape(&mut self) -> bool {
        self.handle_gesture(Gesture::Escape)
    }

    pub fn snapshot(&self) -> EquationSnapshot {
        let (label, hint) = match self.presentation {
            Presentation::Inline => (self.analysis.spoken_text().to_string(), String::new()),
            Presentation::MathMode => (
                self.navigation.label(),
                self.navigation.hint().to_string(),
            ),
        };
        EquationSnapshot {
            label,
            hint,
            mode: self.navigation.mode(),
            current_part_index: self.navigation.current_part_index(),
            parts: self.navigation.parts().to_vec(),
            presentation: self.presentation,
            substantial: self.analysis.is_substantial(),
            spoken_text: self.analysis.spoken_text().to_string(),
        }
    }

    /// Delay until the next timer would fire, if any is pending.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Moves the element clock forward, firing every timer that comes due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now().saturating_add(elapsed);
        while let Some((id, timer)) = self.timers.pop_due(until) {
            trace!(?id, ?timer, "Timer fired");
            match timer {
                ElementTimer::AnnouncementDispatch => {
                    if let Some(item) = self.announcer.on_dispatch_due(id, &mut self.timers) {
                        debug!(
                            element = self.element.0,
                            read_ms = item.read_duration.as_millis() as u64,
                            "Dispatching announcement"
                        );
                        self.collaborators.speak_or_announce(&item.text);
                    }
                }
                ElementTimer::AnnouncementReadComplete => {
                    self.announcer.on_read_complete(id, &mut self.timers);
                }
                ElementTimer::ChildrenChanged => {
                    if self.children_changed == Some(id) {
                        self.children_changed = None;
                        self.collaborators.notify_children_changed(self.element);
                    }
                }
            }
        }
    }

    /// Cancels every timer and resets navigation. Idempotent.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.announcer.reset(&mut self.timers);
        let cancelled = self.timers.cancel_all();
        self.children_changed = None;
        self.navigation.reset();
        self.mounted = false;
        info!(element = self.element.0, cancelled, "Unmounted equation element");
    }

    fn handle_gesture(&mut self, gesture: Gesture) -> bool {
        if !self.mounted {
            debug!(gesture = gesture.name(), "Gesture on unmounted element");
            return false;
        }
        match self.presentation {
            Presentation::Inline => self.handle_inline_gesture(gesture),
            Presentation::MathMode => {
                let full_text = self
                    .config
                    .full_read_verbosity
                    .frame(self.analysis.spoken_text());
                let outcome = transition(&mut self.navigation, gesture, &full_text);
                for action in outcome.actions {
                    self.run_action(action);
                }
                outcome.consumed
            }
        }
    }

    fn handle_inline_gesture(&mut self, gesture: Gesture) -> bool {
        if gesture != Gesture::Activate {
            return false;
        }
        let spoken = self.analysis.spoken_text().to_string();
        self.announcer.clear(&mut self.timers);
        self.announcer.enqueue(&spoken, &mut self.timers);
        self.run_action(NavigationAction::LogInteraction {
            kind: "inline_math",
            label: "speak",
        });
        true
    }

    fn run_action(&mut self, action: NavigationAction) {
        match action {
            NavigationAction::Haptic(cue) => {
                if self.config.haptics_enabled {
                    self.collaborators.pulse(self.intensity(cue));
                }
            }
            NavigationAction::ClearAnnouncements => self.announcer.clear(&mut self.timers),
            NavigationAction::Announce(text) => self.announcer.enqueue(&text, &mut self.timers),
            NavigationAction::NotifyChildrenChanged => self.schedule_children_changed(),
            NavigationAction::LogInteraction { kind, label } => {
                self.collaborators.log_interaction(
                    kind,
                    label,
                    json!({
                        "element": self.element.0,
                        "part_index": self.navigation.current_part_index(),
                        "part_count": self.navigation.parts().len(),
                        "substantial": self.analysis.is_substantial(),
                    }),
                );
            }
        }
    }

    fn intensity(&self, cue: HapticCue) -> f32 {
        match cue {
            HapticCue::Enter => self.config.haptic_enter,
            HapticCue::Read => self.config.haptic_read,
            HapticCue::Step => self.config.haptic_step,
            HapticCue::Exit => self.config.haptic_exit,
        }
    }

    /// Restarts the delay so only the latest change is reported.
    fn schedule_children_changed(&mut self) {
        if let Some(previous) = self.children_changed.take() {
            self.timers.cancel(previous);
        }
        let id = self.timers.schedule(
            self.config.children_changed_delay(),
            ElementTimer::ChildrenChanged,
        );
        self.children_changed = Some(id);
    }
}

impl Drop for EquationElement {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn analysis_options(config: &EngineConfig) -> AnalysisOptions {
    AnalysisOptions {
        classifier: ComplexityClassifier::new(config.min_distinct_triggers),
        infer_mathml_complexity: config.infer_mathml_complexity,
        strategy: config.segmentation,
    }
}

fn presentation_for(analysis: &EquationAnalysis) -> Presentation {
    if analysis.is_substantial() {
        Presentation::MathMode
    } else {
        Presentation::Inline
    }
}
