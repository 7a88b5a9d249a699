//! Keyboard state and action mapping
//!
//! Raw key codes (`KeyboardEvent.code` strings) come in from the platform;
//! the simulation only ever sees the `TickInput` built from them.

use std::collections::HashSet;

use crate::sim::tick::TickInput;

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    Slide,
    Start,
    UseSlot,
    Choice1,
    Choice2,
    Choice3,
    Mute,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Jump,
        Action::Slide,
        Action::Start,
        Action::UseSlot,
        Action::Choice1,
        Action::Choice2,
        Action::Choice3,
        Action::Mute,
    ];

    /// Key codes bound to this action
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Action::Jump => &["Space", "ArrowUp", "KeyW"],
            Action::Slide => &["ArrowDown", "KeyS"],
            Action::Start => &["Space", "Enter"],
            Action::UseSlot => &["KeyE"],
            Action::Choice1 => &["Digit1", "Numpad1"],
            Action::Choice2 => &["Digit2", "Numpad2"],
            Action::Choice3 => &["Digit3", "Numpad3"],
            Action::Mute => &["KeyM"],
        }
    }
}

/// Held keys plus not-yet-consumed presses
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        // Auto-repeat keydowns don't re-arm the edge
        if self.held.insert(code.to_string()) {
            self.pressed.insert(code.to_string());
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
        self.pressed.remove(code);
    }

    /// Level-triggered: any bound key is held
    pub fn is_action_active(&self, action: Action) -> bool {
        action.keys().iter().any(|k| self.held.contains(*k))
    }

    /// Edge-triggered: true once per physical press, consumed by the query
    pub fn was_pressed(&mut self, code: &str) -> bool {
        self.pressed.remove(code)
    }

    /// Forget everything (focus lost, run restarted)
    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    /// Snapshot for one simulation frame. Consumes the mute edge.
    pub fn tick_input(&mut self) -> TickInput {
        let choice = [Action::Choice1, Action::Choice2, Action::Choice3]
            .iter()
            .position(|a| self.is_action_active(*a));
        let mute = Action::Mute
            .keys()
            .iter()
            .fold(false, |acc, k| self.was_pressed(k) || acc);

        TickInput {
            jump: self.is_action_active(Action::Jump),
            slide: self.is_action_active(Action::Slide),
            start: self.is_action_active(Action::Start),
            use_slot: self.is_action_active(Action::UseSlot),
            choice,
            decision: None,
            mute,
            idle_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_are_level_triggered() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        assert!(input.is_action_active(Action::Jump));
        assert!(!input.is_action_active(Action::Start));
        input.key_down("Space");
        assert!(input.is_action_active(Action::Start));
        input.key_up("ArrowUp");
        assert!(input.is_action_active(Action::Jump), "Space still holds jump");
        input.key_up("Space");
        assert!(!input.is_action_active(Action::Jump));
    }

    #[test]
    fn test_was_pressed_consumes() {
        let mut input = InputState::new();
        input.key_down("KeyM");
        assert!(input.was_pressed("KeyM"));
        assert!(!input.was_pressed("KeyM"));
        // Auto-repeat while held doesn't re-arm
        input.key_down("KeyM");
        assert!(!input.was_pressed("KeyM"));
        input.key_up("KeyM");
        input.key_down("KeyM");
        assert!(input.was_pressed("KeyM"));
    }

    #[test]
    fn test_tick_input_snapshot() {
        let mut input = InputState::new();
        input.key_down("KeyS");
        input.key_down("Numpad2");
        input.key_down("KeyM");
        let tick = input.tick_input();
        assert!(tick.slide);
        assert!(!tick.jump);
        assert_eq!(tick.choice, Some(1));
        assert!(tick.mute);

        let tick = input.tick_input();
        assert!(!tick.mute, "mute fires once per press");
        assert!(tick.slide);
    }

    #[test]
    fn test_reset_clears_all() {
        let mut input = InputState::new();
        for action in Action::ALL {
            input.key_down(action.keys()[0]);
        }
        input.reset();
        assert!(Action::ALL.iter().all(|a| !input.is_action_active(*a)));
        assert!(!input.was_pressed("KeyM"));
    }
}
