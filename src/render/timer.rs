use std::time::{Duration, Instant};

use crate::config::rendering::clamp_fps;

/// Monotonic clock started when the surface initializes.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    pub fn elapsed_seconds_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds_at(Instant::now())
    }
}

/// Fixed-rate tick source for the render loop.
///
/// Fires at most once per poll; if the loop falls behind, missed ticks are
/// dropped rather than replayed.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    interval: Duration,
    next: Instant,
}

impl FrameTimer {
    /// `fps` is clamped to the configurable range; NaN runs at the default rate.
    pub fn new(fps: f64, now: Instant) -> Self {
        let interval = Duration::from_secs_f64(1.0 / clamp_fps(fps));
        Self {
            interval,
            next: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next tick is due; feed this to the event loop's wait.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}
