//=========================================================================
// Input Event Types
//
// Host-neutral representation of keyboard, pointer and touch input.
//
// The platform layer (winit, a test harness, a replay file) produces
// `InputEvent`s; the `InputManager` consumes them. Nothing in here knows
// about a specific windowing library.
//
// Conventions:
// - Keys are identified by their logical name as a string ("a", "arrowup",
//   " ", "escape"). Case is normalized by the manager, not the producer.
// - Pointer and touch coordinates are in host (window) space. The manager
//   converts them into surface-local coordinates.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputManager → StateTracker + edge handlers
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::types::Vec2;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// Numeric indices follow the DOM convention: 0 primary, 1 middle,
/// 2 secondary. Anything else is carried through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

impl MouseButton {
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other),
        }
    }

    pub fn index(self) -> u16 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Other(index) => index,
        }
    }
}

//=== Touch ===============================================================

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

impl Touch {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

//=== PointerButton =======================================================

/// Payload for mouse down/up handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerButton {
    pub button: MouseButton,
    /// Surface-local pointer position at the time of the edge.
    pub position: Vec2,
}

//=== InputEvent ==========================================================

/// A single input occurrence delivered by the host.
///
/// Touch events carry the full list of touches still active after the
/// change, which is what handlers receive.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    //--- Keyboard ---------------------------------------------------------
    KeyDown { key: String },
    KeyUp { key: String },

    //--- Mouse ------------------------------------------------------------
    MouseMoved { x: f32, y: f32 },
    MouseButtonDown { button: MouseButton },
    MouseButtonUp { button: MouseButton },

    //--- Touch ------------------------------------------------------------
    TouchStart { touches: Vec<Touch> },
    TouchMove { touches: Vec<Touch> },
    TouchEnd { touches: Vec<Touch> },

    //--- Fallback ---------------------------------------------------------
    Unidentified,
}

impl InputEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        InputEvent::KeyDown { key: key.into() }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        InputEvent::KeyUp { key: key.into() }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. })
    }

    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            InputEvent::TouchStart { .. } | InputEvent::TouchMove { .. } | InputEvent::TouchEnd { .. }
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_button_indices_follow_dom_order() {
        assert_eq!(MouseButton::from_index(0), MouseButton::Left);
        assert_eq!(MouseButton::from_index(1), MouseButton::Middle);
        assert_eq!(MouseButton::from_index(2), MouseButton::Right);
        assert_eq!(MouseButton::from_index(4), MouseButton::Other(4));
        assert_eq!(MouseButton::Right.index(), 2);
    }

    #[test]
    fn event_classification() {
        assert!(InputEvent::key_down("a").is_keyboard());
        assert!(!InputEvent::MouseMoved { x: 0.0, y: 0.0 }.is_keyboard());
        assert!(InputEvent::TouchEnd { touches: vec![] }.is_touch());
        assert!(!InputEvent::Unidentified.is_touch());
    }
}
