//=========================================================================
// Game Engine
//
// Fixed-cadence loop, play-state machine and score ledger shared by every
// game on the portal.
//
// Architecture:
// ```text
//     EngineBuilder ──build()──> GameEngine ──start()──> [scheduled]
//         │                          │
//         ├─ with_surface()          ├─ tick()/frame(now) each refresh
//         ├─ with_fps()              │    clear → update → render → present
//         ├─ with_store()            │    (only while Playing)
//         └─ with_behavior()         └─ on()/off()/emit() lifecycle events
// ```
//
// State machine:
//   Init ──start──> Playing ──pause──> Paused ──resume──> Playing
//   Playing ──game_over──> GameOver ──start──> Playing
//   any ──reset──> Init
//
// `stop()` only controls scheduling, never the play state.
//
//=========================================================================

//=== Module Declarations =================================================

mod event;
mod pacer;
mod scheduler;

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::listeners::{ListenerId, Listeners};
use crate::core::render::{RenderSurface, SurfaceError};
use crate::core::storage::{MemoryStore, SharedStore};
use crate::core::types::Rect;

//=== Public API ==========================================================

pub use event::{EventKind, GameEvent};
pub use pacer::{FramePacer, DEFAULT_FRAME_INTERVAL_MS};
pub use scheduler::{FrameScheduler, InstantScheduler, ManualScheduler};

//=== EngineError =========================================================

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no render surface was provided")]
    SurfaceMissing,

    #[error("failed to acquire 2D drawing context: {0}")]
    ContextUnavailable(#[source] SurfaceError),
}

//=== PlayState ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayState {
    Init,
    Playing,
    Paused,
    GameOver,
}

impl PlayState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayState::Init => "init",
            PlayState::Playing => "playing",
            PlayState::Paused => "paused",
            PlayState::GameOver => "gameOver",
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== GameBehavior ========================================================

/// Per-game logic plugged into the engine.
///
/// Both hooks run only while the engine is `Playing`, update first. They
/// receive the engine itself so a game can score, end the round or draw
/// on the surface.
pub trait GameBehavior<S: RenderSurface> {
    fn update(&mut self, _engine: &mut GameEngine<S>, _delta_ms: f64) {}

    fn render(&mut self, _engine: &mut GameEngine<S>) {}
}

//=== EngineConfig ========================================================

/// Plain engine settings, loadable from JSON.
///
/// # Default Values
///
/// - **game_name**: `"Game"` (keys the persisted high score)
/// - **width** × **height**: 800 × 600
/// - **fps**: 60.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub game_name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game_name: "Game".to_string(),
            width: 800,
            height: 600,
            fps: 60.0,
        }
    }
}

/// Positive, and slow enough that the frame interval is still finite.
fn usable_fps(fps: f64) -> bool {
    fps.is_finite() && fps > 0.0 && (1000.0 / fps).is_finite()
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing a [`GameEngine`].
///
/// # Examples
///
/// ```no_run
/// use arcade_runtime::core::render::SoftwareCanvas;
/// use arcade_runtime::engine::EngineBuilder;
///
/// let mut engine = EngineBuilder::new("Snake")
///     .with_surface(SoftwareCanvas::new(400, 400))
///     .with_size(400, 400)
///     .with_fps(30.0)
///     .build()
///     .expect("engine");
/// engine.start();
/// ```
pub struct EngineBuilder<S: RenderSurface> {
    config: EngineConfig,
    surface: Option<S>,
    store: Option<SharedStore>,
    scheduler: Option<Box<dyn FrameScheduler>>,
    behavior: Option<Box<dyn GameBehavior<S>>>,
}

impl<S: RenderSurface> EngineBuilder<S> {
    /// Creates a builder with default settings for `game_name`.
    pub fn new(game_name: impl Into<String>) -> Self {
        Self::from_config(EngineConfig {
            game_name: game_name.into(),
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            surface: None,
            store: None,
            scheduler: None,
            behavior: None,
        }
    }

    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Sets the logical surface dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Surface size must be positive, got {}x{}", width, height);
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Sets the target frames per second.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `fps` is not a positive finite number.
    pub fn with_fps(mut self, fps: f64) -> Self {
        assert!(usable_fps(fps), "FPS must be positive, got {}", fps);
        self.config.fps = fps;
        self
    }

    /// Store for the persisted high score. Defaults to an in-memory store.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Clock and frame-request source. Defaults to [`InstantScheduler`].
    pub fn with_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn with_behavior(mut self, behavior: impl GameBehavior<S> + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Builds the engine, acquiring the surface's drawing context and
    /// restoring the persisted high score.
    pub fn build(self) -> Result<GameEngine<S>, EngineError> {
        let mut surface = self.surface.ok_or(EngineError::SurfaceMissing)?;
        surface.acquire_context().map_err(EngineError::ContextUnavailable)?;

        let EngineConfig {
            game_name,
            width,
            height,
            fps,
        } = self.config;
        let defaults = EngineConfig::default();
        let fps = if usable_fps(fps) {
            fps
        } else {
            warn!(target: "engine", "Invalid fps {} in config, using {}", fps, defaults.fps);
            defaults.fps
        };
        let (width, height) = if width > 0 && height > 0 {
            (width, height)
        } else {
            warn!(
                target: "engine",
                "Invalid size {}x{} in config, using {}x{}",
                width, height, defaults.width, defaults.height
            );
            (defaults.width, defaults.height)
        };
        surface.set_size(width, height);

        info!(
            target: "engine",
            "Building engine for {} ({}x{} @ {} fps)",
            game_name, width, height, fps
        );

        let mut engine = GameEngine {
            name: game_name,
            surface,
            width,
            height,
            scheduler: self.scheduler.unwrap_or_else(|| Box::new(InstantScheduler::new())),
            pacer: FramePacer::from_fps(fps),
            running: false,
            state: PlayState::Init,
            score: 0,
            high_score: 0,
            store: self.store.unwrap_or_else(MemoryStore::shared),
            listeners: Listeners::new(),
            behavior: self.behavior,
            frames: 0,
        };
        engine.high_score = engine.load_high_score();
        Ok(engine)
    }
}

//=== GameEngine ==========================================================

pub struct GameEngine<S: RenderSurface> {
    name: String,
    surface: S,
    width: u32,
    height: u32,

    scheduler: Box<dyn FrameScheduler>,
    pacer: FramePacer,
    running: bool,

    state: PlayState,
    score: u64,
    high_score: u64,
    store: SharedStore,

    listeners: Listeners<EventKind, GameEvent>,
    behavior: Option<Box<dyn GameBehavior<S>>>,
    frames: u64,
}

impl<S: RenderSurface> GameEngine<S> {
    //--- Lifecycle --------------------------------------------------------

    /// Begins (or restarts) a round.
    ///
    /// From `Init` or `GameOver` this moves to `Playing` and emits
    /// `GameStart`. From `Playing` or `Paused` it only re-schedules a loop
    /// halted by [`stop`](Self::stop).
    pub fn start(&mut self) {
        match self.state {
            PlayState::Init | PlayState::GameOver => {
                self.state = PlayState::Playing;
                self.pacer.rebase(self.scheduler.now());
                self.schedule();
                info!(target: "engine", "{} started", self.name);
                self.emit(&GameEvent::GameStart);
            }
            PlayState::Playing | PlayState::Paused => self.schedule(),
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        self.state = PlayState::Paused;
        debug!(target: "engine", "{} paused", self.name);
        self.emit(&GameEvent::GamePause);
    }

    pub fn resume(&mut self) {
        if self.state != PlayState::Paused {
            return;
        }
        self.state = PlayState::Playing;
        self.pacer.rebase(self.scheduler.now());
        debug!(target: "engine", "{} resumed", self.name);
        self.emit(&GameEvent::GameResume);
    }

    /// Halts the loop, keeping state and score. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.scheduler.cancel_frame();
        info!(target: "engine", "{} stopped", self.name);
        self.emit(&GameEvent::GameStop);
    }

    /// Back to `Init` with a zero score. A running loop keeps running.
    pub fn reset(&mut self) {
        self.score = 0;
        self.state = PlayState::Init;
        debug!(target: "engine", "{} reset", self.name);
        self.emit(&GameEvent::GameReset);
    }

    /// Ends the round, persisting a new high score if one was set.
    pub fn game_over(&mut self) {
        self.state = PlayState::GameOver;

        if self.score > self.high_score {
            self.high_score = self.score;
            self.save_high_score();
        }

        info!(
            target: "engine",
            "{} over (score {}, high score {})",
            self.name, self.score, self.high_score
        );
        self.emit(&GameEvent::GameOver {
            score: self.score,
            high_score: self.high_score,
        });
    }

    /// Stops the loop and drops every subscriber.
    pub fn destroy(&mut self) {
        self.stop();
        self.listeners.clear();
    }

    //--- Loop -------------------------------------------------------------

    /// Runs one frame if the scheduler has one pending. Returns whether a
    /// frame was consumed.
    pub fn tick(&mut self) -> bool {
        if !self.scheduler.is_frame_requested() {
            return false;
        }
        self.scheduler.cancel_frame();
        let now = self.scheduler.now();
        self.frame(now);
        true
    }

    /// One poll of the loop at time `now_ms`.
    ///
    /// A poll at least one frame interval after the last qualifying one
    /// becomes the new reference point; if the engine is `Playing` it then
    /// clears the surface, updates, renders and presents. The next frame
    /// is requested for as long as the loop is running.
    pub fn frame(&mut self, now_ms: f64) {
        if !self.running {
            return;
        }

        if let Some(delta_ms) = self.pacer.poll(now_ms) {
            if self.state == PlayState::Playing {
                self.frames += 1;
                trace!(target: "engine", "Frame {} (delta {:.2} ms)", self.frames, delta_ms);

                self.surface
                    .clear_rect(Rect::new(0.0, 0.0, self.width as f32, self.height as f32));
                self.run_behavior(delta_ms);
                if let Err(err) = self.surface.present() {
                    warn!(target: "engine", "Failed to present frame: {}", err);
                }
            }
        }

        if self.running {
            self.scheduler.request_frame();
        }
    }

    fn run_behavior(&mut self, delta_ms: f64) {
        let Some(mut behavior) = self.behavior.take() else {
            return;
        };
        behavior.update(self, delta_ms);
        behavior.render(self);
        if self.behavior.is_none() {
            self.behavior = Some(behavior);
        }
    }

    fn schedule(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.pacer.rebase(self.scheduler.now());
        self.scheduler.request_frame();
    }

    //--- Score ------------------------------------------------------------

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        self.emit(&GameEvent::ScoreChange { score: self.score });
    }

    fn high_score_key(&self) -> String {
        format!("highScore_{}", self.name)
    }

    fn load_high_score(&self) -> u64 {
        let key = self.high_score_key();
        match self.store.get(&key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(target: "engine", "Ignoring unreadable high score {:?} under {}", raw, key);
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                warn!(target: "engine", "Failed to load high score: {}", err);
                0
            }
        }
    }

    fn save_high_score(&self) {
        if let Err(err) = self.store.set(&self.high_score_key(), &self.high_score.to_string()) {
            warn!(target: "engine", "Failed to save high score: {}", err);
        }
    }

    //--- Events -----------------------------------------------------------

    /// Subscribes `handler` to `kind`. The same closure logic registered
    /// twice fires twice.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.listeners.on(kind, handler)
    }

    pub fn off(&mut self, kind: &EventKind, id: ListenerId) -> bool {
        self.listeners.off(kind, id)
    }

    /// Invokes the subscribers of `event`'s kind in registration order.
    pub fn emit(&mut self, event: &GameEvent) -> usize {
        self.listeners.emit(&event.kind(), event)
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.listeners.count(kind)
    }

    //--- Surface ----------------------------------------------------------

    /// Changes the logical size and the backing surface. Game state is
    /// untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.surface.set_size(width, height);
        debug!(target: "engine", "{} resized to {}x{}", self.name, width, height);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    //--- Query API --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_interval_ms(&self) -> f64 {
        self.pacer.interval_ms()
    }

    /// Frames that ran update/render so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Replaces the game logic.
    pub fn set_behavior(&mut self, behavior: impl GameBehavior<S> + 'static) {
        self.behavior = Some(Box::new(behavior));
    }
}

impl<S: RenderSurface> fmt::Debug for GameEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("running", &self.running)
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("size", &(self.width, self.height))
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
