//=========================================================================
// Arcade Runtime - Library Root
//
// Shared 2D game runtime: fixed-cadence loop with a play-state machine,
// input routing, audio mixing, sprite animation and per-game persistence.
//
// Typical usage:
// ```no_run
// use arcade_runtime::prelude::*;
//
// let engine = EngineBuilder::new("Snake")
//     .with_surface(SoftwareCanvas::new(400, 400))
//     .with_size(400, 400)
//     .build()
//     .expect("engine");
// let host = EngineHost::new(engine, InputManager::new());
// Platform::new(host).run().expect("event loop");
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the host-neutral systems (input, audio, sprites, storage,
// rendering surface). `engine` is the game loop and state machine.
// `platform` runs a game inside a Winit window.
//
pub mod core;
pub mod engine;
pub mod platform;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use engine::{EngineBuilder, EngineError, GameBehavior, GameEngine};
