//=========================================================================
// Input Manager
//
// Turns host `InputEvent`s into level-triggered state and edge-triggered
// callbacks.
//
// Responsibilities:
// - Normalize key identifiers to lower case before any lookup
// - Maintain held keys/buttons, pointer position and active touches
// - Fire per-key press/release handlers on real transitions only
// - Route pointer and touch input only while a surface is attached,
//   translating host coordinates into surface-local ones
//
// Keyboard handling is live from construction. Pointer and touch handling
// requires `attach_surface`. After `destroy` nothing fires and every event
// is ignored.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, MouseButton, PointerButton, Touch};
use super::state_tracker::StateTracker;
use crate::core::listeners::{HandlerList, ListenerId, Listeners};
use crate::core::types::{Rect, Vec2};

//=== Propagation =========================================================

/// What the host should do with the native event after the manager has
/// seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Let the host apply its default behavior.
    Continue,
    /// Suppress default host gestures (scrolling, zooming).
    PreventDefault,
}

//=== InputManager ========================================================

pub struct InputManager {
    state: StateTracker,
    surface: Option<Rect>,
    destroyed: bool,

    //--- Keyed Handlers ---------------------------------------------------
    key_press: Listeners<String, str>,
    key_release: Listeners<String, str>,

    //--- Pointer Handlers -------------------------------------------------
    mouse_move: HandlerList<Vec2>,
    mouse_down: HandlerList<PointerButton>,
    mouse_up: HandlerList<PointerButton>,

    //--- Touch Handlers ---------------------------------------------------
    touch_start: HandlerList<[Touch]>,
    touch_move: HandlerList<[Touch]>,
    touch_end: HandlerList<[Touch]>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            state: StateTracker::new(),
            surface: None,
            destroyed: false,
            key_press: Listeners::new(),
            key_release: Listeners::new(),
            mouse_move: HandlerList::new(),
            mouse_down: HandlerList::new(),
            mouse_up: HandlerList::new(),
            touch_start: HandlerList::new(),
            touch_move: HandlerList::new(),
            touch_end: HandlerList::new(),
        }
    }

    //--- Surface Binding --------------------------------------------------

    /// Binds pointer and touch handling to a surface occupying `bounds`
    /// in host coordinates. Replaces any previously attached surface.
    pub fn attach_surface(&mut self, bounds: Rect) {
        if self.destroyed {
            return;
        }
        if self.surface.replace(bounds).is_some() {
            debug!(target: "input", "Replacing attached surface with {:?}", bounds);
            self.state.clear_pointer();
        } else {
            debug!(target: "input", "Attached surface {:?}", bounds);
        }
    }

    /// Unbinds the surface. Pointer and touch events are ignored afterwards.
    pub fn detach_surface(&mut self) {
        if self.surface.take().is_some() {
            self.state.clear_pointer();
        }
    }

    pub fn surface_bounds(&self) -> Option<Rect> {
        self.surface
    }

    //--- Event Handling ---------------------------------------------------

    /// Applies one host event and fires matching handlers synchronously.
    pub fn handle_event(&mut self, event: &InputEvent) -> Propagation {
        if self.destroyed {
            return Propagation::Continue;
        }

        match event {
            InputEvent::KeyDown { key } => {
                let key = key.to_lowercase();
                if self.state.press_key(&key) {
                    trace!(target: "input", "Key pressed: {:?}", key);
                    self.key_press.emit(key.as_str(), key.as_str());
                }
                Propagation::Continue
            }

            InputEvent::KeyUp { key } => {
                let key = key.to_lowercase();
                if self.state.release_key(&key) {
                    trace!(target: "input", "Key released: {:?}", key);
                    self.key_release.emit(key.as_str(), key.as_str());
                }
                Propagation::Continue
            }

            InputEvent::MouseMoved { x, y } => {
                let Some(local) = self.to_local(*x, *y) else {
                    return Propagation::Continue;
                };
                self.state.set_mouse_position(local);
                self.mouse_move.dispatch(&local);
                Propagation::Continue
            }

            InputEvent::MouseButtonDown { button } => {
                if self.surface.is_some() && self.state.press_button(*button) {
                    let payload = self.pointer_payload(*button);
                    self.mouse_down.dispatch(&payload);
                }
                Propagation::Continue
            }

            InputEvent::MouseButtonUp { button } => {
                if self.surface.is_some() && self.state.release_button(*button) {
                    let payload = self.pointer_payload(*button);
                    self.mouse_up.dispatch(&payload);
                }
                Propagation::Continue
            }

            InputEvent::TouchStart { touches } => self.apply_touches(touches, TouchPhase::Start),
            InputEvent::TouchMove { touches } => self.apply_touches(touches, TouchPhase::Move),
            InputEvent::TouchEnd { touches } => self.apply_touches(touches, TouchPhase::End),

            InputEvent::Unidentified => Propagation::Continue,
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Level-triggered, case-insensitive key query.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.state.is_key_down(&key.to_lowercase())
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.state.is_button_down(button)
    }

    /// Last pointer position in surface-local coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.state.mouse_position()
    }

    /// Active touches in surface-local coordinates.
    pub fn touches(&self) -> &[Touch] {
        self.state.touches()
    }

    //--- Key Handlers -----------------------------------------------------

    /// Fires `handler` each time `key` goes from released to pressed.
    pub fn on_key_press<F>(&mut self, key: &str, handler: F) -> ListenerId
    where
        F: FnMut(&str) + 'static,
    {
        self.key_press.on(key.to_lowercase(), handler)
    }

    /// Fires `handler` each time `key` goes from pressed to released.
    pub fn on_key_release<F>(&mut self, key: &str, handler: F) -> ListenerId
    where
        F: FnMut(&str) + 'static,
    {
        self.key_release.on(key.to_lowercase(), handler)
    }

    pub fn off_key_press(&mut self, key: &str, id: ListenerId) -> bool {
        self.key_press.off(key.to_lowercase().as_str(), id)
    }

    pub fn off_key_release(&mut self, key: &str, id: ListenerId) -> bool {
        self.key_release.off(key.to_lowercase().as_str(), id)
    }

    //--- Pointer Handlers -------------------------------------------------

    pub fn on_mouse_move<F: FnMut(&Vec2) + 'static>(&mut self, handler: F) -> ListenerId {
        self.mouse_move.push(handler)
    }

    pub fn on_mouse_down<F: FnMut(&PointerButton) + 'static>(&mut self, handler: F) -> ListenerId {
        self.mouse_down.push(handler)
    }

    pub fn on_mouse_up<F: FnMut(&PointerButton) + 'static>(&mut self, handler: F) -> ListenerId {
        self.mouse_up.push(handler)
    }

    pub fn off_mouse_move(&mut self, id: ListenerId) -> bool {
        self.mouse_move.remove(id)
    }

    pub fn off_mouse_down(&mut self, id: ListenerId) -> bool {
        self.mouse_down.remove(id)
    }

    pub fn off_mouse_up(&mut self, id: ListenerId) -> bool {
        self.mouse_up.remove(id)
    }

    //--- Touch Handlers ---------------------------------------------------

    pub fn on_touch_start<F: FnMut(&[Touch]) + 'static>(&mut self, handler: F) -> ListenerId {
        self.touch_start.push(handler)
    }

    pub fn on_touch_move<F: FnMut(&[Touch]) + 'static>(&mut self, handler: F) -> ListenerId {
        self.touch_move.push(handler)
    }

    pub fn on_touch_end<F: FnMut(&[Touch]) + 'static>(&mut self, handler: F) -> ListenerId {
        self.touch_end.push(handler)
    }

    pub fn off_touch_start(&mut self, id: ListenerId) -> bool {
        self.touch_start.remove(id)
    }

    pub fn off_touch_move(&mut self, id: ListenerId) -> bool {
        self.touch_move.remove(id)
    }

    pub fn off_touch_end(&mut self, id: ListenerId) -> bool {
        self.touch_end.remove(id)
    }

    //--- Teardown ---------------------------------------------------------

    /// Drops every handler and the surface binding. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.surface = None;
        self.state.clear();

        self.key_press.clear();
        self.key_release.clear();
        self.mouse_move.clear();
        self.mouse_down.clear();
        self.mouse_up.clear();
        self.touch_start.clear();
        self.touch_move.clear();
        self.touch_end.clear();

        info!(target: "input", "Input manager destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    //--- Internal Helpers -------------------------------------------------

    fn to_local(&self, x: f32, y: f32) -> Option<Vec2> {
        self.surface.map(|bounds| Vec2::new(x - bounds.x, y - bounds.y))
    }

    fn pointer_payload(&self, button: MouseButton) -> PointerButton {
        PointerButton {
            button,
            position: self.state.mouse_position(),
        }
    }

    fn apply_touches(&mut self, touches: &[Touch], phase: TouchPhase) -> Propagation {
        let Some(bounds) = self.surface else {
            return Propagation::Continue;
        };

        let local: Vec<Touch> = touches
            .iter()
            .map(|t| Touch {
                id: t.id,
                x: t.x - bounds.x,
                y: t.y - bounds.y,
            })
            .collect();
        self.state.set_touches(local);

        let handlers = match phase {
            TouchPhase::Start => &mut self.touch_start,
            TouchPhase::Move => &mut self.touch_move,
            TouchPhase::End => &mut self.touch_end,
        };
        handlers.dispatch(self.state.touches());

        Propagation::PreventDefault
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

//=== TouchPhase ==========================================================

#[derive(Debug, Clone, Copy)]
enum TouchPhase {
    Start,
    Move,
    End,
}

//=========================================================================
// Unit Tests
//=========================================================================
