//=========================================================================
// Platform Subsystem
//
// Hosts a game in a native window through Winit.
//
// Architecture:
// ```text
//  Main Thread
//  ┌──────────────────────────────────────────────┐
//  │  Winit Event Loop                            │
//  │   ├─ Keyboard / Mouse / Touch                │
//  │   │    ↓ event_mapper                        │
//  │   │  InputEvent ──> HostedGame::handle_input │
//  │   │                                          │
//  │   ├─ Resized ─────> HostedGame::resized      │
//  │   │                                          │
//  │   └─ RedrawRequested                         │
//  │        ↓                                     │
//  │      HostedGame::frame() ── wants more? ──┐  │
//  │        ↑                                  │  │
//  │        └──────── request_redraw() <───────┘  │
//  └──────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **RedrawRequested = frame poll**: the display refresh drives the
//   engine's fixed-cadence gate, like a browser's animation frame
// - **Software presentation**: `EngineHost` copies the surface's
//   framebuffer into a `pixels` buffer after every frame poll
// - **Input wakes the loop**: every input event requests a redraw, so a
//   handler that calls `start()` on a stopped engine gets its frame
// - **Main thread requirement**: Winit mandates main thread on macOS/iOS
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod presenter;

//=== External Crates =====================================================

use std::sync::Arc;

use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::audio::AudioManager;
use crate::core::input::{InputEvent, InputManager, Propagation};
use crate::core::render::RenderSurface;
use crate::core::types::Rect;
use crate::engine::GameEngine;
use event_mapper::{map_window_event, TouchTracker};
pub use presenter::WindowPresenter;

//=== PlatformError =======================================================

/// Event loop errors. Fatal: without an event loop nothing can run.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

//=== HostedGame ==========================================================

/// What the window host drives.
pub trait HostedGame {
    fn title(&self) -> String {
        "Arcade".to_string()
    }

    /// Initial logical window size.
    fn size(&self) -> (u32, u32);

    /// Called once the window exists, e.g. to set up a pixel presenter.
    fn window_created(&mut self, _window: &Arc<Window>) {}

    fn handle_input(&mut self, event: &InputEvent) -> Propagation;

    fn resized(&mut self, _width: u32, _height: u32) {}

    /// One display refresh. Returns whether another frame is wanted.
    fn frame(&mut self) -> bool;

    fn shutdown(&mut self) {}
}

//=== EngineHost ==========================================================

/// The usual composition: an engine, its input router and optionally an
/// audio manager, wired to the window. Surfaces with a framebuffer are
/// shown through a [`WindowPresenter`].
pub struct EngineHost<S: RenderSurface> {
    pub engine: GameEngine<S>,
    pub input: InputManager,
    pub audio: Option<AudioManager>,
    presenter: Option<WindowPresenter>,
    title: String,
}

impl<S: RenderSurface> EngineHost<S> {
    /// Binds pointer input to the whole engine surface.
    pub fn new(engine: GameEngine<S>, input: InputManager) -> Self {
        let mut host = Self {
            title: engine.name().to_string(),
            engine,
            input,
            audio: None,
            presenter: None,
        };
        host.bind_surface();
        host
    }

    pub fn with_audio(mut self, audio: AudioManager) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn is_presenting(&self) -> bool {
        self.presenter.is_some()
    }

    fn bind_surface(&mut self) {
        let bounds = Rect::new(0.0, 0.0, self.engine.width() as f32, self.engine.height() as f32);
        self.input.attach_surface(bounds);
    }

    fn present(&mut self) {
        let (Some(presenter), Some(frame)) = (self.presenter.as_mut(), self.engine.surface().framebuffer()) else {
            return;
        };
        if let Err(e) = presenter.present(frame) {
            warn!(target: "platform", "Failed to present frame: {}", e);
        }
    }
}

impl<S: RenderSurface> HostedGame for EngineHost<S> {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn size(&self) -> (u32, u32) {
        (self.engine.width(), self.engine.height())
    }

    fn window_created(&mut self, window: &Arc<Window>) {
        if self.engine.surface().framebuffer().is_none() {
            debug!(target: "platform", "Surface has no framebuffer, nothing to present");
            return;
        }
        match WindowPresenter::new(Arc::clone(window), self.engine.width(), self.engine.height()) {
            Ok(presenter) => self.presenter = Some(presenter),
            Err(e) => error!(target: "platform", "Presenter creation failed: {}", e),
        }
    }

    fn handle_input(&mut self, event: &InputEvent) -> Propagation {
        self.input.handle_event(event)
    }

    fn resized(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.engine.resize(width, height);
        self.bind_surface();
        if let Some(presenter) = self.presenter.as_mut() {
            if let Err(e) = presenter.resize(width, height) {
                warn!(target: "platform", "Presenter resize failed: {}", e);
            }
        }
    }

    fn frame(&mut self) -> bool {
        if let Some(audio) = self.audio.as_mut() {
            audio.poll_loads();
            audio.update();
        }
        self.engine.tick();
        self.present();
        self.engine.is_running()
    }

    fn shutdown(&mut self) {
        self.presenter = None;
        self.engine.destroy();
        self.input.destroy();
        if let Some(audio) = self.audio.as_mut() {
            audio.destroy();
        }
    }
}

//=== Platform ============================================================

/// Window owner and event pump for one [`HostedGame`].
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(game)`
/// 2. **Execution**: `platform.run()` blocks in the Winit event loop
/// 3. **Window**: created lazily in `resumed()` (mobile compatibility)
/// 4. **Shutdown**: close request → `HostedGame::shutdown` → exit
pub struct Platform<G: HostedGame> {
    window: Option<Arc<Window>>,
    game: G,
    touches: TouchTracker,
    scale_factor: f64,
}

impl<G: HostedGame> Platform<G> {
    //--- Construction -----------------------------------------------------

    pub fn new(game: G) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            game,
            touches: TouchTracker::new(),
            scale_factor: 1.0,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes, then hands the game
    /// back.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<G, PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        info!(target: "platform", "Event loop exited");
        Ok(self.game)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    //--- Internal Helpers -------------------------------------------------

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.game.shutdown();
        event_loop.exit();
    }
}

//=== Winit Integration ===================================================

impl<G: HostedGame> ApplicationHandler for Platform<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let (width, height) = self.game.size();
        let attrs = WindowAttributes::default()
            .with_title(self.game.title())
            .with_inner_size(LogicalSize::new(width, height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.scale_factor = window.scale_factor();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    self.scale_factor
                );
                self.game.window_created(&window);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.shutdown(event_loop);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
            }

            WindowEvent::Resized(size) => {
                let logical = size.to_logical::<u32>(self.scale_factor);
                debug!(target: "platform", "Resized to {}x{}", logical.width, logical.height);
                self.game.resized(logical.width, logical.height);
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if self.game.frame() {
                    self.request_redraw();
                }
            }

            _ => {
                if let Some(input) = map_window_event(&event, self.scale_factor, &mut self.touches) {
                    trace!(target: "platform::input", "{:?}", input);
                    self.game.handle_input(&input);
                    self.request_redraw();
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::testing::FakeBackend;
    use crate::core::audio::AudioManager;
    use crate::core::render::testing::RecordingSurface;
    use crate::core::render::SoftwareCanvas;
    use crate::core::storage::MemoryStore;
    use crate::engine::{EngineBuilder, ManualScheduler, PlayState};
    use std::cell::Cell;
    use std::rc::Rc;

    fn host() -> (EngineHost<RecordingSurface>, ManualScheduler) {
        let clock = ManualScheduler::new();
        let engine = EngineBuilder::new("Breakout")
            .with_surface(RecordingSurface::new(1, 1))
            .with_size(320, 240)
            .with_scheduler(clock.clone())
            .build()
            .unwrap();
        (EngineHost::new(engine, InputManager::new()), clock)
    }

    #[test]
    fn host_binds_input_to_engine_surface() {
        let (host, _) = host();
        assert_eq!(host.title(), "Breakout");
        assert_eq!(host.size(), (320, 240));
        assert_eq!(host.input.surface_bounds(), Some(Rect::new(0.0, 0.0, 320.0, 240.0)));
    }

    #[test]
    fn resize_follows_window_and_ignores_minimize() {
        let (mut host, _) = host();
        host.resized(640, 480);
        assert_eq!(host.size(), (640, 480));
        assert_eq!(host.input.surface_bounds(), Some(Rect::new(0.0, 0.0, 640.0, 480.0)));

        host.resized(0, 0);
        assert_eq!(host.size(), (640, 480));
    }

    #[test]
    fn input_reaches_handlers_that_drive_the_engine() {
        let (mut host, _) = host();
        let presses = Rc::new(Cell::new(0));
        let counter = presses.clone();
        host.input.on_key_press(" ", move |_| counter.set(counter.get() + 1));

        host.handle_input(&InputEvent::key_down(" "));
        host.handle_input(&InputEvent::key_down(" "));
        assert_eq!(presses.get(), 1);
        assert!(host.input.is_key_pressed(" "));
    }

    #[test]
    fn frame_wants_more_only_while_running() {
        let (mut host, clock) = host();
        assert!(!host.frame());

        host.engine.start();
        clock.advance(20.0);
        assert!(host.frame());
        assert_eq!(host.engine.frames_processed(), 1);

        host.engine.stop();
        assert!(!host.frame());
    }

    #[test]
    fn shutdown_tears_everything_down() {
        let (host, _) = host();
        let (backend, state) = FakeBackend::new();
        let audio = AudioManager::new(Some(Box::new(backend)), MemoryStore::shared());
        let mut host = host.with_audio(audio);

        host.engine.start();
        host.shutdown();

        assert!(!host.engine.is_running());
        assert_eq!(host.engine.state(), PlayState::Playing);
        assert!(host.input.is_destroyed());
        assert!(state.borrow().closed);
    }

    #[test]
    fn framebuffer_is_only_offered_by_software_surfaces() {
        let (host, _) = host();
        assert!(host.engine.surface().framebuffer().is_none());

        let engine = EngineBuilder::new("Breakout")
            .with_surface(SoftwareCanvas::new(1, 1))
            .with_size(32, 24)
            .with_scheduler(ManualScheduler::new())
            .build()
            .unwrap();
        let mut host = EngineHost::new(engine, InputManager::new());
        let frame = host.engine.surface().framebuffer().unwrap();
        assert_eq!(frame.dimensions(), (32, 24));

        // No window yet: frames still run, nothing is presented.
        assert!(!host.is_presenting());
        host.engine.start();
        assert!(host.frame());
    }

    #[test]
    fn platform_creation_is_lazy() {
        let (host, _) = host();
        let platform = Platform::new(host);
        assert!(platform.window.is_none(), "Window should be created lazily");
        assert_eq!(platform.game().size(), (320, 240));
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
