//=========================================================================
// State Tracker
//=========================================================================
//
// Level-triggered input state: which keys and buttons are held, where the
// pointer is, which touches are active.
//
// Architecture:
//   InputManager → press_*/release_* → HashSet → query
//
// Every mutator reports whether it was a real transition so the manager
// can fire edge handlers only on press/release edges.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{MouseButton, Touch};
use crate::core::types::Vec2;

//=== StateTracker ========================================================

#[derive(Debug, Default)]
pub struct StateTracker {
    keys_down: HashSet<String>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
    touches: Vec<Touch>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Keyboard ---------------------------------------------------------

    /// Marks `key` held. Returns `true` only if it was not already held,
    /// so auto-repeat does not count as a new press.
    pub(super) fn press_key(&mut self, key: &str) -> bool {
        if self.keys_down.contains(key) {
            return false;
        }
        self.keys_down.insert(key.to_string())
    }

    /// Marks `key` released. Returns `true` only if it was actually held.
    pub(super) fn release_key(&mut self, key: &str) -> bool {
        self.keys_down.remove(key)
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    //--- Mouse ------------------------------------------------------------

    pub(super) fn press_button(&mut self, button: MouseButton) -> bool {
        self.mouse_buttons_down.insert(button)
    }

    pub(super) fn release_button(&mut self, button: MouseButton) -> bool {
        self.mouse_buttons_down.remove(&button)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    pub(super) fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    //--- Touch ------------------------------------------------------------

    pub(super) fn set_touches(&mut self, touches: Vec<Touch>) {
        self.touches = touches;
    }

    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    //--- Reset ------------------------------------------------------------

    /// Forgets pointer and touch state. Keyboard state is kept.
    pub(super) fn clear_pointer(&mut self) {
        self.mouse_buttons_down.clear();
        self.mouse_position = Vec2::ZERO;
        self.touches.clear();
    }

    pub(super) fn clear(&mut self) {
        self.keys_down.clear();
        self.clear_pointer();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut state = StateTracker::new();
        assert!(state.press_key("a"));
        assert!(!state.press_key("a"));
        assert!(state.is_key_down("a"));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = StateTracker::new();
        assert!(!state.release_key("a"));
        state.press_key("a");
        assert!(state.release_key("a"));
        assert!(!state.is_key_down("a"));
    }

    #[test]
    fn buttons_track_independently() {
        let mut state = StateTracker::new();
        assert!(state.press_button(MouseButton::Left));
        assert!(state.is_button_down(MouseButton::Left));
        assert!(!state.is_button_down(MouseButton::Right));
        assert!(!state.press_button(MouseButton::Left));
        assert!(state.release_button(MouseButton::Left));
    }

    #[test]
    fn clear_pointer_keeps_keys() {
        let mut state = StateTracker::new();
        state.press_key("w");
        state.press_button(MouseButton::Left);
        state.set_mouse_position(Vec2::new(3.0, 4.0));
        state.set_touches(vec![Touch { id: 1, x: 0.0, y: 0.0 }]);

        state.clear_pointer();

        assert!(state.is_key_down("w"));
        assert!(!state.is_button_down(MouseButton::Left));
        assert_eq!(state.mouse_position(), Vec2::ZERO);
        assert!(state.touches().is_empty());
    }
}
