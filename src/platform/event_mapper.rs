//=========================================================================
// Platform Event Mapper
//
// Converts Winit window events into engine-level `InputEvent`s.
//
// Responsibilities:
// - Name keys the way web games expect ("a", "ArrowUp", " ", "Escape")
// - Convert physical cursor/touch positions into logical pixels
// - Rebuild the "all active touches" list Winit does not track for us
// - Ignore everything else
//
//=========================================================================

use std::collections::BTreeMap;

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, TouchPhase, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::core::input::{InputEvent, MouseButton, Touch};

//=== Key Naming ==========================================================
//
// Character keys keep their produced text; named keys use their Winit
// name, which matches the DOM `KeyboardEvent.key` value for the keys
// games care about. Space is the exception: DOM reports it as " ".
//

pub(crate) fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        Key::Unidentified(_) | Key::Dead(_) => None,
    }
}

fn map_key_event(event: &KeyEvent) -> Option<InputEvent> {
    let KeyEvent { logical_key, state, .. } = event;
    let key = key_name(logical_key)?;
    Some(match state {
        ElementState::Pressed => InputEvent::KeyDown { key },
        ElementState::Released => InputEvent::KeyUp { key },
    })
}

//=== Mouse Conversion ====================================================

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Back => MouseButton::Other(3),
            WinitMouseButton::Forward => MouseButton::Other(4),
            WinitMouseButton::Other(index) => MouseButton::Other(index),
        }
    }
}

fn logical(position: PhysicalPosition<f64>, scale_factor: f64) -> (f32, f32) {
    let logical = position.to_logical::<f32>(scale_factor);
    (logical.x, logical.y)
}

//=== TouchTracker ========================================================
//
// Winit reports one touch point per event. Handlers want the full set of
// touches still down after each change, ordered by id.
//

#[derive(Debug, Default)]
pub(crate) struct TouchTracker {
    active: BTreeMap<u64, Touch>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) -> InputEvent {
        match phase {
            TouchPhase::Started => {
                self.active.insert(id, Touch { id, x, y });
                InputEvent::TouchStart { touches: self.snapshot() }
            }
            TouchPhase::Moved => {
                self.active.insert(id, Touch { id, x, y });
                InputEvent::TouchMove { touches: self.snapshot() }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active.remove(&id);
                InputEvent::TouchEnd { touches: self.snapshot() }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    fn snapshot(&self) -> Vec<Touch> {
        self.active.values().copied().collect()
    }
}

//=== Full Event Conversion ===============================================
//
// Returns `None` for window events that carry no input.
//

pub(crate) fn map_window_event(
    event: &WindowEvent,
    scale_factor: f64,
    touches: &mut TouchTracker,
) -> Option<InputEvent> {
    match event {
        //--- Keyboard Input ----------------------------------------------
        WindowEvent::KeyboardInput { event, .. } => map_key_event(event),

        //--- Mouse Input -------------------------------------------------
        WindowEvent::MouseInput { state, button, .. } => {
            let button = MouseButton::from(*button);
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonDown { button },
                ElementState::Released => InputEvent::MouseButtonUp { button },
            })
        }

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = logical(*position, scale_factor);
            Some(InputEvent::MouseMoved { x, y })
        }

        //--- Touch Input -------------------------------------------------
        WindowEvent::Touch(touch) => {
            let (x, y) = logical(touch.location, scale_factor);
            Some(touches.apply(touch.id, touch.phase, x, y))
        }

        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_keys_keep_their_text() {
        assert_eq!(key_name(&Key::Character("a".into())).as_deref(), Some("a"));
        assert_eq!(key_name(&Key::Character("W".into())).as_deref(), Some("W"));
    }

    #[test]
    fn named_keys_use_dom_names() {
        assert_eq!(key_name(&Key::Named(NamedKey::ArrowUp)).as_deref(), Some("ArrowUp"));
        assert_eq!(key_name(&Key::Named(NamedKey::Escape)).as_deref(), Some("Escape"));
        assert_eq!(key_name(&Key::Named(NamedKey::Enter)).as_deref(), Some("Enter"));
        assert_eq!(key_name(&Key::Named(NamedKey::Space)).as_deref(), Some(" "));
    }

    #[test]
    fn dead_keys_are_dropped() {
        assert_eq!(key_name(&Key::Dead(None)), None);
    }

    #[test]
    fn mouse_buttons_follow_dom_indices() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left).index(), 0);
        assert_eq!(MouseButton::from(WinitMouseButton::Middle).index(), 1);
        assert_eq!(MouseButton::from(WinitMouseButton::Right).index(), 2);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(MouseButton::from(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }

    #[test]
    fn physical_positions_become_logical() {
        assert_eq!(logical(PhysicalPosition::new(200.0, 100.0), 2.0), (100.0, 50.0));
    }

    #[test]
    fn touch_tracker_reports_remaining_touches() {
        let mut tracker = TouchTracker::new();

        let start = tracker.apply(7, TouchPhase::Started, 1.0, 1.0);
        assert_eq!(start, InputEvent::TouchStart { touches: vec![Touch { id: 7, x: 1.0, y: 1.0 }] });

        tracker.apply(2, TouchPhase::Started, 5.0, 5.0);
        let moved = tracker.apply(7, TouchPhase::Moved, 3.0, 4.0);
        assert_eq!(
            moved,
            InputEvent::TouchMove {
                touches: vec![Touch { id: 2, x: 5.0, y: 5.0 }, Touch { id: 7, x: 3.0, y: 4.0 }]
            }
        );

        let ended = tracker.apply(2, TouchPhase::Cancelled, 5.0, 5.0);
        assert_eq!(ended, InputEvent::TouchEnd { touches: vec![Touch { id: 7, x: 3.0, y: 4.0 }] });

        tracker.apply(7, TouchPhase::Ended, 3.0, 4.0);
        assert_eq!(tracker.len(), 0);
    }
}
