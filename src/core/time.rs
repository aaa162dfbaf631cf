//! Frame timing utilities

use std::time::{Duration, Instant};

/// Seconds elapsed from `start` to `now`, at millisecond resolution.
///
/// Returns 0.0 when `now` precedes `start`.
pub fn elapsed_secs(start: Instant, now: Instant) -> f32 {
    let ms = now.saturating_duration_since(start).as_millis();
    ms as f32 / 1000.0
}

/// Tracks per-frame delta and a once-per-second FPS estimate
pub struct FrameTimer {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps_frame_count: u32,
    fps: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a timer whose clock starts at `now`
    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps_frame_count: 0,
            fps: 0.0,
        }
    }

    /// Call once per frame
    pub fn tick(&mut self) -> Instant {
        let now = Instant::now();
        self.tick_at(now);
        now
    }

    /// Advance the timer to `now`. Instants earlier than the last frame are
    /// treated as a zero-length frame.
    pub fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = self.last_frame.max(now);
        self.frame_count += 1;
        self.fps_frame_count += 1;

        let fps_elapsed = self.last_frame - self.fps_timer;
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = self.last_frame;
        }
    }

    /// Delta of the last frame in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.last_frame - self.start
    }

    /// FPS, refreshed once per second
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
