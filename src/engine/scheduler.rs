//=========================================================================
// Frame Scheduler
//=========================================================================
//
// Clock plus "call me next frame" flag, the two things the engine loop
// needs from its host.
//
//   ManualScheduler    caller-driven clock, for tests and headless runs
//   InstantScheduler   monotonic wall clock, used by the window host
//
// The host asks `is_frame_requested()` after each display refresh and,
// if set, runs one engine frame. The engine re-requests while running.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

//=== FrameScheduler ======================================================

pub trait FrameScheduler {
    /// Monotonic time in milliseconds.
    fn now(&self) -> f64;

    fn request_frame(&mut self);

    /// Withdraws a pending request. No-op if none.
    fn cancel_frame(&mut self);

    fn is_frame_requested(&self) -> bool;
}

//=== ManualScheduler =====================================================

#[derive(Debug, Default)]
struct ManualState {
    now_ms: Cell<f64>,
    requested: Cell<bool>,
}

/// Scheduler whose clock only moves when told to.
///
/// Clones share one clock, so a test can keep a handle after giving the
/// scheduler to an engine.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, now_ms: f64) {
        self.state.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.state.now_ms.set(self.state.now_ms.get() + delta_ms);
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.state.now_ms.get()
    }

    fn request_frame(&mut self) {
        self.state.requested.set(true);
    }

    fn cancel_frame(&mut self) {
        self.state.requested.set(false);
    }

    fn is_frame_requested(&self) -> bool {
        self.state.requested.get()
    }
}

//=== InstantScheduler ====================================================

/// Wall-clock scheduler measuring from its own creation.
#[derive(Debug, Clone)]
pub struct InstantScheduler {
    origin: Instant,
    requested: bool,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            requested: false,
        }
    }
}

impl Default for InstantScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for InstantScheduler {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&mut self) {
        self.requested = true;
    }

    fn cancel_frame(&mut self) {
        self.requested = false;
    }

    fn is_frame_requested(&self) -> bool {
        self.requested
    }
}

//=========================================================================
// Tests
//=========================================================================
