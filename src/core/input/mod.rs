//=========================================================================
// Input System
//
// Keyboard, pointer and touch input for games.
//
// Responsibilities:
// - Accept host-neutral `InputEvent`s from the platform layer
// - Track held keys/buttons, pointer position and active touches
// - Dispatch edge-triggered callbacks for press/release transitions
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
mod input_manager;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, MouseButton, PointerButton, Touch};
pub use input_manager::{InputManager, Propagation};

/// Registration handle returned by every `on_*` method.
pub use crate::core::listeners::ListenerId as HandlerId;
