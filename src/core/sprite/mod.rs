//=========================================================================
// Sprites
//=========================================================================
//
// Spritesheet frame animation and bounding-box queries.
//
//   animation   Frame / SpriteAnimation data
//   sprite      per-entity playback state and rendering
//   loader      bulk creation and loading by id
//
//=========================================================================

//=== Module Declarations =================================================

mod animation;
mod loader;
mod sprite;

//=== External Dependencies ===============================================

use thiserror::Error;

use crate::core::assets::AssetError;

//=== Public API ==========================================================

pub use animation::{Frame, SpriteAnimation};
pub use loader::{LoadSummary, SpriteLoader};
pub use sprite::Sprite;

//=== SpriteError =========================================================

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("failed to load sprite sheet {src}: {source}")]
    Load {
        src: String,
        #[source]
        source: AssetError,
    },

    #[error("failed to load sprite(s): {}", failed.join(", "))]
    Batch { failed: Vec<String> },
}
