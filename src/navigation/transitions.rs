use super::{NavigationMode, NavigationState};
use tracing::{debug, info};

pub const END_OF_EQUATION: &str = "End of equation";
pub const BEGINNING_OF_EQUATION: &str = "Beginning of equation";
pub const EXITED_MATH_MODE: &str = "Exited math mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Double tap.
    Activate,
    RotorNext,
    RotorPrevious,
    /// Two-finger scrub.
    Escape,
}

impl Gesture {
    pub fn name(self) -> &'static str {
        match self {
            Gesture::Activate => "activate",
            Gesture::RotorNext => "rotor-next",
            Gesture::RotorPrevious => "rotor-previous",
            Gesture::Escape => "escape",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticCue {
    /// Strong.
    Enter,
    /// Medium-strong.
    Read,
    /// Light.
    Step,
    /// Medium.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    Haptic(HapticCue),
    ClearAnnouncements,
    Announce(String),
    NotifyChildrenChanged,
    LogInteraction {
        kind: &'static str,
        label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// False when the gesture should fall through to outer navigation.
    pub consumed: bool,
    pub actions: Vec<NavigationAction>,
}

impl Transition {
    fn consumed(actions: Vec<NavigationAction>) -> Self {
        Self {
            consumed: true,
            actions,
        }
    }

    fn ignored() -> Self {
        Self {
            consumed: false,
            actions: Vec::new(),
        }
    }
}

pub fn mode_entered_instructions(part_count: usize) -> String {
    let parts = if part_count == 1 {
        "1 part".to_string()
    } else {
        format!("{part_count} parts")
    };
    format!(
        "Math mode. {parts}. Swipe up or down to move between parts. \
         Double tap to hear the full equation. Two finger scrub to exit."
    )
}

/// Applies one gesture to the state and returns the side effects to run.
pub fn transition(
    state: &mut NavigationState,
    gesture: Gesture,
    full_equation_text: &str,
) -> Transition {
    match (state.mode(), gesture) {
        (NavigationMode::Inactive, Gesture::Activate) => on_enter(state),
        (NavigationMode::MathMode, Gesture::Activate) => on_read_full(full_equation_text),
        (NavigationMode::MathMode, Gesture::RotorNext) => on_rotor_next(state),
        (NavigationMode::MathMode, Gesture::RotorPrevious) => on_rotor_previous(state),
        (NavigationMode::MathMode, Gesture::Escape) => on_exit(state),
        (NavigationMode::Inactive, _) => {
            debug!(gesture = gesture.name(), "Gesture not handled outside math mode");
            Transition::ignored()
        }
    }
}

fn on_enter(state: &mut NavigationState) -> Transition {
    state.enter();
    info!(parts = state.parts().len(), "Entered math mode");
    Transition::consumed(vec![
        NavigationAction::Haptic(HapticCue::Enter),
        NavigationAction::Announce(mode_entered_instructions(state.parts().len())),
        NavigationAction::NotifyChildrenChanged,
        NavigationAction::LogInteraction {
            kind: "math_mode",
            label: "enter",
        },
    ])
}

fn on_read_full(full_equation_text: &str) -> Transition {
    debug!("Reading full equation");
    Transition::consumed(vec![
        NavigationAction::Haptic(HapticCue::Read),
        NavigationAction::ClearAnnouncements,
        NavigationAction::Announce(full_equation_text.to_string()),
        NavigationAction::LogInteraction {
            kind: "math_mode",
            label: "read_full",
        },
    ])
}

fn on_rotor_next(state: &mut NavigationState) -> Transition {
    let announcement = if state.step_forward() {
        part_announcement(state)
    } else {
        END_OF_EQUATION.to_string()
    };
    debug!(index = state.current_part_index(), "Rotor next");
    Transition::consumed(vec![
        NavigationAction::Haptic(HapticCue::Step),
        NavigationAction::Announce(announcement),
    ])
}

fn on_rotor_previous(state: &mut NavigationState) -> Transition {
    let announcement = if state.step_back() {
        part_announcement(state)
    } else {
        BEGINNING_OF_EQUATION.to_string()
    };
    debug!(index = state.current_part_index(), "Rotor previous");
    Transition::consumed(vec![
        NavigationAction::Haptic(HapticCue::Step),
        NavigationAction::Announce(announcement),
    ])
}

fn on_exit(state: &mut NavigationState) -> Transition {
    state.reset();
    info!("Exited math mode");
    Transition::consumed(vec![
        NavigationAction::Haptic(HapticCue::Exit),
        NavigationAction::ClearAnnouncements,
        NavigationAction::Announce(EXITED_MATH_MODE.to_string()),
        NavigationAction::NotifyChildrenChanged,
        NavigationAction::LogInteraction {
            kind: "math_mode",
            label: "exit",
        },
    ])
}

fn part_announcement(state: &NavigationState) -> String {
    let spoken = state
        .current_part()
        .map(|part| part.spoken_text())
        .unwrap_or_default();
    format!(
        "{spoken}. {} of {}",
        state.current_part_index() + 1,
        state.parts().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathsense_core::segment_parts;

    fn announcements(transition: &Transition) -> Vec<&str> {
        transition
            .actions
            .iter()
            .filter_map(|action| match action {
                NavigationAction::Announce(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn three_terms() -> NavigationState {
        NavigationState::new(segment_parts("term one, term two, term three"))
    }

    #[test]
    fn activate_enters_math_mode_with_instructions() {
        let mut state = three_terms();
        let result = transition(&mut state, Gesture::Activate, "full");
        assert!(result.consumed);
        assert!(state.is_math_mode());
        assert_eq!(result.actions[0], NavigationAction::Haptic(HapticCue::Enter));
        assert!(result.actions.contains(&NavigationAction::NotifyChildrenChanged));
        assert_eq!(
            announcements(&result),
            vec![
                "Math mode. 3 parts. Swipe up or down to move between parts. \
                 Double tap to hear the full equation. Two finger scrub to exit."
            ]
        );
    }

    #[test]
    fn single_part_instructions_are_singular() {
        assert!(mode_entered_instructions(1).starts_with("Math mode. 1 part. "));
    }

    #[test]
    fn activate_in_math_mode_rereads_full_equation() {
        let mut state = three_terms();
        transition(&mut state, Gesture::Activate, "full text");
        transition(&mut state, Gesture::RotorNext, "full text");
        let result = transition(&mut state, Gesture::Activate, "full text");
        assert_eq!(
            result.actions,
            vec![
                NavigationAction::Haptic(HapticCue::Read),
                NavigationAction::ClearAnnouncements,
                NavigationAction::Announce("full text".to_string()),
                NavigationAction::LogInteraction {
                    kind: "math_mode",
                    label: "read_full"
                },
            ]
        );
        assert_eq!(state.current_part_index(), 1);
    }

    #[test]
    fn two_rotor_nexts_land_on_the_last_term() {
        let mut state = three_terms();
        transition(&mut state, Gesture::Activate, "");
        transition(&mut state, Gesture::RotorNext, "");
        let result = transition(&mut state, Gesture::RotorNext, "");
        assert_eq!(state.current_part_index(), 2);
        assert_eq!(announcements(&result), vec!["term three. 3 of 3"]);
        assert_eq!(state.label(), "Part 3 of 3: term three");
    }

    #[test]
    fn excess_rotor_next_announces_end_without_moving() {
        let mut state = three_terms();
        transition(&mut state, Gesture::Activate, "");
        for _ in 0..2 {
            transition(&mut state, Gesture::RotorNext, "");
        }
        for _ in 0..5 {
            let result = transition(&mut state, Gesture::RotorNext, "");
            assert!(result.consumed);
            assert_eq!(announcements(&result), vec![END_OF_EQUATION]);
            assert_eq!(result.actions[0], NavigationAction::Haptic(HapticCue::Step));
            assert_eq!(state.current_part_index(), 2);
        }
    }

    #[test]
    fn rotor_previous_at_start_announces_beginning() {
        let mut state = three_terms();
        transition(&mut state, Gesture::Activate, "");
        let result = transition(&mut state, Gesture::RotorPrevious, "");
        assert_eq!(announcements(&result), vec![BEGINNING_OF_EQUATION]);
        transition(&mut state, Gesture::RotorNext, "");
        let back = transition(&mut state, Gesture::RotorPrevious, "");
        assert_eq!(announcements(&back), vec!["term one. 1 of 3"]);
    }

    #[test]
    fn escape_exits_and_reentry_starts_at_zero() {
        let mut state = three_terms();
        transition(&mut state, Gesture::Activate, "");
        transition(&mut state, Gesture::RotorNext, "");
        transition(&mut state, Gesture::RotorNext, "");
        let exit = transition(&mut state, Gesture::Escape, "");
        assert!(exit.consumed);
        assert_eq!(state.mode(), NavigationMode::Inactive);
        assert_eq!(state.current_part_index(), 0);
        assert_eq!(announcements(&exit), vec![EXITED_MATH_MODE]);
        assert_eq!(exit.actions[1], NavigationAction::ClearAnnouncements);

        transition(&mut state, Gesture::Activate, "");
        assert_eq!(state.current_part_index(), 0);
    }

    #[test]
    fn gestures_other_than_activate_fall_through_when_inactive() {
        for gesture in [Gesture::Escape, Gesture::RotorNext, Gesture::RotorPrevious] {
            let mut state = three_terms();
            let before = state.clone();
            let result = transition(&mut state, gesture, "");
            assert!(!result.consumed);
            assert!(result.actions.is_empty());
            assert_eq!(state, before);
        }
    }
}
