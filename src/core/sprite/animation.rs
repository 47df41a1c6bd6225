//=========================================================================
// Sprite Animation Data
//=========================================================================
//
// Plain data describing how a spritesheet is cut into frames.
//
// Serialized form (camelCase):
//   { "name": "run", "frameDuration": 100, "loop": true,
//     "frames": [ { "x": 0, "y": 0, "width": 32, "height": 32 }, ... ] }
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::types::Rect;

//=== Frame ===============================================================

/// One rectangle of the spritesheet, optionally overriding the animation's
/// frame duration (milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Frame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }
}

//=== SpriteAnimation =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteAnimation {
    pub name: String,
    pub frames: Vec<Frame>,
    /// Default frame duration in milliseconds.
    pub frame_duration: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl SpriteAnimation {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>, frame_duration: f64, looping: bool) -> Self {
        Self {
            name: name.into(),
            frames,
            frame_duration,
            looping,
        }
    }

    /// Builds an animation from `count` frames the size of `first`, laid
    /// out left to right starting at `first`.
    pub fn strip(
        name: impl Into<String>,
        first: Rect,
        count: usize,
        frame_duration: f64,
        looping: bool,
    ) -> Self {
        let frames = (0..count)
            .map(|i| {
                let x = first.x + i as f32 * first.width;
                Frame::new(x, first.y, first.width, first.height)
            })
            .collect();
        Self::new(name, frames, frame_duration, looping)
    }

    /// Duration of frame `index`, honoring per-frame overrides.
    pub fn duration_of(&self, index: usize) -> Option<f64> {
        self.frames
            .get(index)
            .map(|frame| frame.duration.unwrap_or(self.frame_duration))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
