use std::time::{Duration, Instant};

/// Repeating deadline polled from the UI loop.
///
/// A timer is either stopped or has exactly one pending deadline. Starting an
/// already running timer replaces its deadline, so there is never more than one
/// outstanding schedule per handle.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Returns whether a running timer was cancelled.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    pub fn restart(&mut self, now: Instant) {
        self.stop();
        self.start(now);
    }

    /// Changes the period. A running timer keeps its current deadline until
    /// it is restarted.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Consumes the pending deadline if it has passed and schedules the next
    /// one a full period from `now`. Missed periods are not replayed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IntervalTimer;
    use std::time::{Duration, Instant};

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        let now = Instant::now();
        assert!(!timer.fire_due(now + Duration::from_secs(10)));
        assert!(!timer.stop());
    }

    #[test]
    fn fires_once_per_period_without_replay() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(Duration::from_secs(30));
        timer.start(start);

        assert!(!timer.fire_due(start + Duration::from_secs(29)));
        let late = start + Duration::from_secs(95);
        assert!(timer.fire_due(late));
        assert!(!timer.fire_due(late));
        assert_eq!(timer.next_due(), Some(late + Duration::from_secs(30)));
    }

    #[test]
    fn restart_keeps_single_deadline() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(Duration::from_secs(10));
        timer.start(start);
        timer.restart(start + Duration::from_secs(7));
        assert_eq!(timer.next_due(), Some(start + Duration::from_secs(17)));
        assert!(timer.stop());
        assert!(!timer.stop());
    }
}
