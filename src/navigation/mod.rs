//! Math-mode navigation over an equation's parts.

mod transitions;

pub use transitions::{
    BEGINNING_OF_EQUATION, END_OF_EQUATION, EXITED_MATH_MODE, Gesture, HapticCue,
    NavigationAction, Transition, mode_entered_instructions, transition,
};

use mathsense_core::{FALLBACK_PART_TEXT, Granularity, Part};
use serde::Serialize;
use ts_rs::TS;

pub const INACTIVE_LABEL: &str = "Math equation";
pub const INACTIVE_HINT: &str = "Double tap to enter math mode";
pub const MATH_MODE_LABEL: &str = "Math mode";
pub const MATH_MODE_HINT: &str = "Double tap to hear full equation. Two finger scrub to exit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum NavigationMode {
    #[default]
    Inactive,
    MathMode,
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NavigationMode::Inactive => "inactive",
            NavigationMode::MathMode => "math-mode",
        };
        write!(f, "{}", label)
    }
}

/// Mode plus cursor. `parts` is never empty, and in math mode
/// `current_part_index < parts.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    mode: NavigationMode,
    current_part_index: usize,
    parts: Vec<Part>,
}

impl NavigationState {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            mode: NavigationMode::Inactive,
            current_part_index: 0,
            parts: non_empty(parts),
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn is_math_mode(&self) -> bool {
        self.mode == NavigationMode::MathMode
    }

    pub fn current_part_index(&self) -> usize {
        self.current_part_index
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn current_part(&self) -> Option<&Part> {
        self.parts.get(self.current_part_index)
    }

    pub fn last_index(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    pub fn label(&self) -> String {
        match self.mode {
            NavigationMode::Inactive => INACTIVE_LABEL.to_string(),
            NavigationMode::MathMode => match self.current_part() {
                Some(part) => format!(
                    "Part {} of {}: {}",
                    self.current_part_index + 1,
                    self.parts.len(),
                    part.display_text()
                ),
                None => MATH_MODE_LABEL.to_string(),
            },
        }
    }

    pub fn hint(&self) -> &'static str {
        match self.mode {
            NavigationMode::Inactive => INACTIVE_HINT,
            NavigationMode::MathMode => MATH_MODE_HINT,
        }
    }

    /// Back to inactive at the first part.
    pub fn reset(&mut self) {
        self.mode = NavigationMode::Inactive;
        self.current_part_index = 0;
    }

    /// Swaps in freshly segmented parts and resets.
    pub fn replace_parts(&mut self, parts: Vec<Part>) {
        self.parts = non_empty(parts);
        self.reset();
    }

    pub(crate) fn enter(&mut self) {
        self.mode = NavigationMode::MathMode;
        self.current_part_index = 0;
    }

    pub(crate) fn step_forward(&mut self) -> bool {
        if self.current_part_index < self.last_index() {
            self.current_part_index += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn step_back(&mut self) -> bool {
        if self.current_part_index > 0 {
            self.current_part_index -= 1;
            true
        } else {
            false
        }
    }
}

fn non_empty(parts: Vec<Part>) -> Vec<Part> {
    if parts.is_empty() {
        vec![Part::new(
            1,
            FALLBACK_PART_TEXT,
            FALLBACK_PART_TEXT,
            Granularity::Structure,
        )]
    } else {
        parts
    }
}
