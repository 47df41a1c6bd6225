//=========================================================================
// Frame Pacer
//=========================================================================
//
// Fixed-cadence gate over a variable-rate poll.
//
// The host polls on every display refresh; a poll "qualifies" once at
// least one frame interval has elapsed since the last qualifying poll.
// Qualifying polls report the elapsed time as the frame delta and become
// the new reference point. There is no catch-up: a long stall yields one
// frame with a large delta, not several.
//
//=========================================================================

/// Milliseconds per frame at 60 fps.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacer {
    interval_ms: f64,
    last_frame_ms: f64,
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        assert!(
            interval_ms.is_finite() && interval_ms > 0.0,
            "Frame interval must be positive, got {}",
            interval_ms
        );
        Self {
            interval_ms,
            last_frame_ms: 0.0,
        }
    }

    pub fn from_fps(fps: f64) -> Self {
        Self::new(1000.0 / fps)
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    /// Makes `now` the reference point, so time before it never shows up
    /// as frame delta.
    pub fn rebase(&mut self, now_ms: f64) {
        self.last_frame_ms = now_ms;
    }

    /// Returns the frame delta if `now` qualifies, advancing the reference
    /// point; `None` otherwise.
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        let delta = now_ms - self.last_frame_ms;
        if delta >= self.interval_ms {
            self.last_frame_ms = now_ms;
            Some(delta)
        } else {
            None
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL_MS)
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_polls_do_not_qualify() {
        let mut pacer = FramePacer::default();
        pacer.rebase(1000.0);
        assert_eq!(pacer.poll(1005.0), None);
        assert_eq!(pacer.poll(1016.0), None);
        assert_eq!(pacer.last_frame_ms(), 1000.0);
    }

    #[test]
    fn qualifying_poll_reports_delta_and_advances() {
        let mut pacer = FramePacer::new(10.0);
        pacer.rebase(0.0);
        assert_eq!(pacer.poll(10.0), Some(10.0));
        assert_eq!(pacer.poll(15.0), None);
        assert_eq!(pacer.poll(23.0), Some(13.0));
    }

    #[test]
    fn stall_yields_a_single_large_frame() {
        let mut pacer = FramePacer::new(10.0);
        pacer.rebase(0.0);
        assert_eq!(pacer.poll(95.0), Some(95.0));
        assert_eq!(pacer.poll(100.0), None);
    }

    #[test]
    fn rebase_hides_elapsed_time() {
        let mut pacer = FramePacer::new(10.0);
        pacer.rebase(0.0);
        pacer.rebase(500.0);
        assert_eq!(pacer.poll(505.0), None);
        assert_eq!(pacer.poll(510.0), Some(10.0));
    }

    #[test]
    fn from_fps_computes_interval() {
        assert!((FramePacer::from_fps(30.0).interval_ms() - 33.333).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "Frame interval must be positive")]
    fn zero_interval_panics() {
        FramePacer::new(0.0);
    }
}
