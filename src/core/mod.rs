//=========================================================================
// Core Systems
//
// Host-neutral building blocks every game composes.
//
// Responsibilities:
// - Shared value types (geometry, settings, score records)
// - Keyed listener tables used by the engine and the input router
// - Background asset fetching
// - Input routing, rendering surface, sprites, audio and storage
//
// Notes:
// Nothing in here depends on a window system. The `platform` module feeds
// these types from Winit; tests feed them directly.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod assets;
pub mod audio;
pub mod input;
pub mod listeners;
pub mod render;
pub mod sprite;
pub mod storage;
pub mod types;
