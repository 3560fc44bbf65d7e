//! Frame timing statistics.
//!
//! The simulation itself counts in frames and never reads the clock. [`FrameTimer`] exists for
//! the hosts, which log frame rates and run durations.
//!
//! ```ignore
//! let mut timer = FrameTimer::new();
//!
//! // after every frame:
//! if timer.tick() {
//!     log::debug!("{:.1} fps", timer.fps());
//! }
//! ```

use std::time::{Duration, Instant};

/// Counts frames and measures the frame rate over a sliding interval.
#[derive(Debug)]
pub struct FrameTimer {
    /// When the timer was created.
    start: Instant,
    /// Total frames since start.
    frame_count: u64,
    /// Frame rate over the last completed interval.
    fps: f32,
    /// Frame count at the last FPS update.
    fps_frame_count: u64,
    /// Time of the last FPS update.
    fps_update_time: Instant,
    /// How often the FPS is recalculated.
    fps_update_interval: Duration,
}

impl FrameTimer {
    /// Create a timer starting now that updates its FPS every 500 ms.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Create a timer with a custom FPS update interval.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Record one frame. Returns `true` when the FPS value was just recalculated.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed < self.fps_update_interval || fps_elapsed.is_zero() {
            return false;
        }
        let frames_since = self.frame_count - self.fps_frame_count;
        self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        true
    }

    /// Total frames recorded.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last completed interval. 0 until the first interval ends.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time since the timer was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Mean time per recorded frame since start.
    pub fn mean_frame_time(&self) -> Duration {
        if self.frame_count == 0 {
            return Duration::ZERO;
        }
        self.elapsed().div_f64(self.frame_count as f64)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
