//=========================================================================
// Sprite
//=========================================================================
//
// Frame-animation state machine over a spritesheet image.
//
// Lifecycle:
//   new(src) → add_animation(..) → load() or set_image(..) → start_play()
//            → update(delta) each tick → render(surface, x, y) each frame
//
// Invariants:
// - While an animation is current and has frames, the frame index is in
//   [0, frames.len()).
// - An animation with no frames renders nothing and never advances.
// - A sprite without a loaded image renders nothing but still animates.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::warn;

//=== Internal Dependencies ===============================================

use super::animation::{Frame, SpriteAnimation};
use super::SpriteError;
use crate::core::assets::{self, AssetError};
use crate::core::render::{Image, RenderSurface};
use crate::core::types::{Rect, Vec2};

//=== Image Fetching ======================================================

/// Fetches and decodes a spritesheet. Runs on the caller's thread.
pub(super) fn fetch_image(src: &str) -> Result<Image, AssetError> {
    let bytes = assets::fetch_bytes(src)?;
    Image::decode(&bytes).map_err(|err| AssetError::Decode {
        id: src.to_string(),
        reason: err.to_string(),
    })
}

//=== Sprite ==============================================================

pub struct Sprite {
    src: String,
    image: Option<Image>,

    //--- Animation State --------------------------------------------------
    animations: HashMap<String, SpriteAnimation>,
    current: Option<String>,
    frame_index: usize,
    frame_time: f64,
    playing: bool,
    on_complete: Option<Box<dyn FnMut()>>,

    //--- Presentation -----------------------------------------------------
    flip_x: bool,
    flip_y: bool,
    opacity: f32,
    scale: f32,
    rotation: f32,
}

impl Sprite {
    /// Creates a sprite for the spritesheet at `src`. Nothing is fetched
    /// until `load` (or a `SpriteLoader`) runs.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            image: None,
            animations: HashMap::new(),
            current: None,
            frame_index: 0,
            frame_time: 0.0,
            playing: false,
            on_complete: None,
            flip_x: false,
            flip_y: false,
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    //--- Image ------------------------------------------------------------

    /// Fetches and decodes the spritesheet, blocking the caller.
    pub fn load(&mut self) -> Result<(), SpriteError> {
        if self.image.is_some() {
            return Ok(());
        }
        let image = fetch_image(&self.src).map_err(|source| SpriteError::Load {
            src: self.src.clone(),
            source,
        })?;
        self.image = Some(image);
        Ok(())
    }

    pub fn set_image(&mut self, image: Image) {
        self.image = Some(image);
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    //--- Animations -------------------------------------------------------

    /// Registers `animation`, replacing one with the same name. The first
    /// animation ever added becomes current.
    pub fn add_animation(&mut self, animation: SpriteAnimation) {
        let name = animation.name.clone();
        self.animations.insert(name.clone(), animation);
        if self.current.is_none() {
            self.set_animation(&name, true);
        }
    }

    /// Switches to `name`. Returns `false` and logs a warning if no such
    /// animation exists.
    pub fn set_animation(&mut self, name: &str, reset_frame: bool) -> bool {
        let Some(animation) = self.animations.get(name) else {
            warn!(target: "sprite", "Animation '{}' not found on {}", name, self.src);
            return false;
        };

        let frame_count = animation.frames.len();
        self.current = Some(name.to_string());
        if reset_frame {
            self.frame_index = 0;
            self.frame_time = 0.0;
        } else if self.frame_index >= frame_count {
            self.frame_index = frame_count.saturating_sub(1);
        }
        true
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    //--- Playback ---------------------------------------------------------

    /// Rewinds to the first frame and plays.
    pub fn start_play(&mut self) {
        self.playing = true;
        self.frame_index = 0;
        self.frame_time = 0.0;
    }

    /// Rewinds to the first frame, stops, and always invokes the
    /// completion callback.
    pub fn stop_play(&mut self) {
        self.playing = false;
        self.frame_index = 0;
        self.frame_time = 0.0;
        self.fire_complete();
    }

    pub fn pause_play(&mut self) {
        self.playing = false;
    }

    pub fn resume_play(&mut self) {
        self.playing = true;
    }

    /// Sets the callback invoked when a non-looping animation ends or
    /// `stop_play` is called.
    pub fn on_complete<F: FnMut() + 'static>(&mut self, callback: F) {
        self.on_complete = Some(Box::new(callback));
    }

    //--- Update -----------------------------------------------------------

    /// Advances the animation by `delta_ms`. At most one frame advances per
    /// call; leftover time carries into the next call.
    pub fn update(&mut self, delta_ms: f64) {
        if !self.playing {
            return;
        }
        let Some((duration, frame_count, looping)) = self.current_animation_ref().and_then(|anim| {
            anim.duration_of(self.frame_index)
                .map(|duration| (duration, anim.frames.len(), anim.looping))
        }) else {
            return;
        };

        self.frame_time += delta_ms;
        if self.frame_time < duration {
            return;
        }

        self.frame_time -= duration;
        self.frame_index += 1;

        if self.frame_index >= frame_count {
            if looping {
                self.frame_index = 0;
            } else {
                self.frame_index = frame_count - 1;
                self.playing = false;
                self.fire_complete();
            }
        }
    }

    //--- Rendering --------------------------------------------------------

    /// Draws the current frame centered at `(x, y)`. Transform and alpha
    /// changes are bracketed by save/restore.
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S, x: f32, y: f32) {
        let (Some(frame), Some(image)) = (self.current_frame(), self.image.as_ref()) else {
            return;
        };

        surface.save();
        surface.translate(x, y);
        if self.rotation != 0.0 {
            surface.rotate(self.rotation);
        }
        let scale_x = if self.flip_x { -self.scale } else { self.scale };
        let scale_y = if self.flip_y { -self.scale } else { self.scale };
        surface.scale(scale_x, scale_y);
        if self.opacity != 1.0 {
            surface.set_global_alpha(self.opacity);
        }

        let Rect { width, height, .. } = frame.rect;
        surface.draw_image(
            image,
            frame.rect,
            Rect::new(-width / 2.0, -height / 2.0, width, height),
        );
        surface.restore();
    }

    //--- Presentation Setters ---------------------------------------------

    pub fn set_flip_x(&mut self, flipped: bool) {
        self.flip_x = flipped;
    }

    pub fn set_flip_y(&mut self, flipped: bool) {
        self.flip_y = flipped;
    }

    /// Clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Radians, clockwise.
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    //--- Geometry ---------------------------------------------------------

    /// Scaled width of the current frame, 0 without one.
    pub fn width(&self) -> f32 {
        self.current_frame()
            .map(|frame| frame.rect.width * self.scale)
            .unwrap_or(0.0)
    }

    /// Scaled height of the current frame, 0 without one.
    pub fn height(&self) -> f32 {
        self.current_frame()
            .map(|frame| frame.rect.height * self.scale)
            .unwrap_or(0.0)
    }

    /// Axis-aligned box of the current frame centered at `at`.
    pub fn bounds(&self, at: Vec2) -> Option<Rect> {
        self.current_frame().map(|frame| {
            let scale = self.scale.abs();
            Rect::centered(at.x, at.y, frame.rect.width * scale, frame.rect.height * scale)
        })
    }

    /// Hit test of `point` against this sprite drawn at `at`. Edges count.
    pub fn contains_point(&self, point: Vec2, at: Vec2) -> bool {
        self.bounds(at).is_some_and(|bounds| bounds.contains(point))
    }

    /// Bounding-box overlap with `other`. False if either has no frame.
    pub fn collides_with(&self, other: &Sprite, at: Vec2, other_at: Vec2) -> bool {
        match (self.bounds(at), other.bounds(other_at)) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn current_animation_ref(&self) -> Option<&SpriteAnimation> {
        self.current.as_ref().and_then(|name| self.animations.get(name))
    }

    fn current_frame(&self) -> Option<&Frame> {
        self.current_animation_ref()
            .and_then(|anim| anim.frames.get(self.frame_index))
    }

    fn fire_complete(&mut self) {
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("src", &self.src)
            .field("loaded", &self.image.is_some())
            .field("current", &self.current)
            .field("frame_index", &self.frame_index)
            .field("playing", &self.playing)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::testing::{solid_image, DrawOp, RecordingSurface};
    use std::cell::Cell;
    use std::rc::Rc;

    //--- Test Helpers -----------------------------------------------------

    fn sprite_with(frames: usize, looping: bool) -> Sprite {
        let mut sprite = Sprite::new("sheet.png");
        sprite.add_animation(SpriteAnimation::strip("run", Rect::new(0.0, 0.0, 16.0, 8.0), frames, 100.0, looping));
        sprite
    }

    fn completion_counter(sprite: &mut Sprite) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        sprite.on_complete(move || c.set(c.get() + 1));
        count
    }

    //--- Animation Selection ----------------------------------------------

    #[test]
    fn first_animation_becomes_current() {
        let mut sprite = sprite_with(2, true);
        sprite.add_animation(SpriteAnimation::strip("jump", Rect::new(0.0, 8.0, 16.0, 8.0), 2, 80.0, false));
        assert_eq!(sprite.current_animation(), Some("run"));
    }

    #[test]
    fn unknown_animation_is_rejected() {
        let mut sprite = sprite_with(2, true);
        assert!(!sprite.set_animation("fly", true));
        assert_eq!(sprite.current_animation(), Some("run"));
    }

    #[test]
    fn switching_without_reset_keeps_index_in_range() {
        let mut sprite = sprite_with(4, true);
        sprite.add_animation(SpriteAnimation::strip("blink", Rect::new(0.0, 8.0, 16.0, 8.0), 2, 100.0, true));
        sprite.start_play();
        for _ in 0..3 {
            sprite.update(100.0);
        }
        assert_eq!(sprite.frame_index(), 3);

        assert!(sprite.set_animation("blink", false));
        assert_eq!(sprite.frame_index(), 1);
    }

    //--- Playback ---------------------------------------------------------

    #[test]
    fn non_looping_completes_exactly_once_on_last_update() {
        let mut sprite = sprite_with(4, false);
        let completions = completion_counter(&mut sprite);
        sprite.start_play();

        for expected in 1..4 {
            sprite.update(100.0);
            assert_eq!(sprite.frame_index(), expected);
            assert_eq!(completions.get(), 0);
        }

        sprite.update(100.0);
        assert_eq!(sprite.frame_index(), 3);
        assert_eq!(completions.get(), 1);
        assert!(!sprite.is_playing());

        sprite.update(100.0);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn looping_wraps_and_never_completes() {
        let mut sprite = sprite_with(3, true);
        let completions = completion_counter(&mut sprite);
        sprite.start_play();

        for _ in 0..3 {
            sprite.update(100.0);
        }
        assert_eq!(sprite.frame_index(), 0);
        assert!(sprite.is_playing());
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn one_advance_per_call_with_remainder_carried() {
        let mut sprite = sprite_with(5, false);
        sprite.start_play();

        sprite.update(250.0);
        assert_eq!(sprite.frame_index(), 1, "Large delta advances a single frame");

        sprite.update(0.0);
        assert_eq!(sprite.frame_index(), 2, "Carried 150ms covers the next frame");

        sprite.update(40.0);
        assert_eq!(sprite.frame_index(), 2);
        sprite.update(10.0);
        assert_eq!(sprite.frame_index(), 3);
    }

    #[test]
    fn stop_play_always_fires_completion() {
        let mut sprite = sprite_with(3, true);
        let completions = completion_counter(&mut sprite);
        sprite.start_play();
        sprite.update(100.0);

        sprite.stop_play();
        assert_eq!(sprite.frame_index(), 0);
        assert!(!sprite.is_playing());
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn pause_and_resume_keep_position() {
        let mut sprite = sprite_with(3, true);
        sprite.start_play();
        sprite.update(100.0);
        sprite.pause_play();
        sprite.update(500.0);
        assert_eq!(sprite.frame_index(), 1);

        sprite.resume_play();
        sprite.update(100.0);
        assert_eq!(sprite.frame_index(), 2);
    }

    #[test]
    fn empty_animation_never_advances_or_renders() {
        let mut sprite = Sprite::new("sheet.png");
        sprite.add_animation(SpriteAnimation::new("nothing", vec![], 100.0, false));
        sprite.set_image(solid_image(4, 4));
        sprite.start_play();
        sprite.update(1000.0);

        let mut surface = RecordingSurface::new(64, 64);
        sprite.render(&mut surface, 10.0, 10.0);

        assert_eq!(sprite.frame_index(), 0);
        assert!(surface.ops.is_empty());
        assert_eq!(sprite.width(), 0.0);
    }

    //--- Rendering --------------------------------------------------------

    #[test]
    fn render_waits_for_image() {
        let sprite = sprite_with(2, true);
        let mut surface = RecordingSurface::new(64, 64);
        sprite.render(&mut surface, 0.0, 0.0);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn render_applies_transform_inside_save_restore() {
        let mut sprite = sprite_with(2, true);
        sprite.set_image(solid_image(32, 8));
        sprite.set_rotation(0.5);
        sprite.set_scale(2.0);
        sprite.set_flip_x(true);
        sprite.set_opacity(0.25);

        let mut surface = RecordingSurface::new(64, 64);
        sprite.render(&mut surface, 20.0, 30.0);

        assert_eq!(
            surface.take_ops(),
            vec![
                DrawOp::Save,
                DrawOp::Translate(20.0, 30.0),
                DrawOp::Rotate(0.5),
                DrawOp::Scale(-2.0, 2.0),
                DrawOp::Alpha(0.25),
                DrawOp::Draw {
                    src: Rect::new(0.0, 0.0, 16.0, 8.0),
                    dest: Rect::new(-8.0, -4.0, 16.0, 8.0),
                },
                DrawOp::Restore,
            ]
        );
    }

    #[test]
    fn default_presentation_skips_rotate_and_alpha() {
        let mut sprite = sprite_with(1, false);
        sprite.set_image(solid_image(16, 8));
        let mut surface = RecordingSurface::new(64, 64);
        sprite.render(&mut surface, 0.0, 0.0);

        let ops = surface.take_ops();
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Rotate(_) | DrawOp::Alpha(_))));
        assert!(ops.contains(&DrawOp::Scale(1.0, 1.0)));
    }

    #[test]
    fn opacity_is_clamped() {
        let mut sprite = Sprite::new("x.png");
        sprite.set_opacity(3.0);
        assert_eq!(sprite.opacity(), 1.0);
        sprite.set_opacity(-1.0);
        assert_eq!(sprite.opacity(), 0.0);
    }

    //--- Geometry ---------------------------------------------------------

    #[test]
    fn size_follows_scale() {
        let mut sprite = sprite_with(1, false);
        sprite.set_scale(1.5);
        assert_eq!(sprite.width(), 24.0);
        assert_eq!(sprite.height(), 12.0);
    }

    #[test]
    fn contains_point_uses_scaled_half_extents() {
        let sprite = sprite_with(1, false);
        let at = Vec2::new(100.0, 100.0);
        assert!(sprite.contains_point(Vec2::new(108.0, 104.0), at));
        assert!(!sprite.contains_point(Vec2::new(108.5, 100.0), at));
    }

    #[test]
    fn collision_is_symmetric() {
        let a = sprite_with(1, false);
        let mut b = sprite_with(1, false);
        b.set_scale(2.0);

        let cases = [
            (Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), true),
            (Vec2::new(0.0, 0.0), Vec2::new(24.0, 0.0), true),
            (Vec2::new(0.0, 0.0), Vec2::new(24.5, 0.0), false),
            (Vec2::new(0.0, 0.0), Vec2::new(0.0, 13.0), false),
        ];
        for (pa, pb, expected) in cases {
            assert_eq!(a.collides_with(&b, pa, pb), expected, "{pa:?} vs {pb:?}");
            assert_eq!(b.collides_with(&a, pb, pa), expected, "{pb:?} vs {pa:?}");
        }
    }

    #[test]
    fn no_collision_without_current_frame() {
        let a = sprite_with(1, false);
        let b = Sprite::new("empty.png");
        assert!(!a.collides_with(&b, Vec2::ZERO, Vec2::ZERO));
        assert!(!b.collides_with(&a, Vec2::ZERO, Vec2::ZERO));
    }
}
