use std::time::{Duration, Instant};

pub const COUNTER_TWEEN_DURATION: Duration = Duration::from_millis(1000);

pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Animated transition of a displayed counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterTween {
    pub start: u64,
    pub end: u64,
    pub started_at: Instant,
    pub duration: Duration,
}

impl CounterTween {
    pub fn new(start: u64, end: u64, started_at: Instant) -> Self {
        Self {
            start,
            end,
            started_at,
            duration: COUNTER_TWEEN_DURATION,
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Always within `[min(start, end), max(start, end)]`.
    pub fn value_at(&self, now: Instant) -> u64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.end;
        }
        let span = self.end as f64 - self.start as f64;
        let value = (self.start as f64 + span * ease_out_cubic(progress)).round() as u64;
        value.clamp(self.start.min(self.end), self.start.max(self.end))
    }
}
