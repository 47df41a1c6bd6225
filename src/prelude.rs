//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use arcade_runtime::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{
    EngineBuilder, EngineConfig, EventKind, FrameScheduler, GameBehavior, GameEngine, GameEvent,
    InstantScheduler, ManualScheduler, PlayState,
};

// Input system
pub use crate::core::input::{InputEvent, InputManager, MouseButton, Propagation, Touch};

// Rendering and sprites
pub use crate::core::render::{Color, Image, RenderSurface, SoftwareCanvas};
pub use crate::core::sprite::{Frame, Sprite, SpriteAnimation, SpriteLoader};

// Audio
pub use crate::core::audio::{AudioAsset, AudioManager};

// Storage
pub use crate::core::storage::{FileStore, GameStorage, KeyValueStore, MemoryStore, SharedStore};

// Shared types
pub use crate::core::types::{Difficulty, Direction, GameSettings, Rect, Size, Vec2};

// Window host
pub use crate::platform::{EngineHost, HostedGame, Platform};
