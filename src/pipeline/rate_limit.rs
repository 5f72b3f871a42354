use std::time::Duration;

/// Minimum-interval gate on a monotonic millisecond clock.
///
/// Sensors report at up to ~60 Hz; classification output is only useful at
/// a lower rate. Updates inside the interval are refused and the caller keeps
/// the freshest raw value for the next allowed update.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval_ms: u64,
    last_emit_ms: Option<u64>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval_ms: min_interval.as_millis() as u64,
            last_emit_ms: None,
        }
    }

    /// Whether an update at `now_ms` would be let through
    pub fn is_ready(&self, now_ms: u64) -> bool {
        match self.last_emit_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        }
    }

    /// Let the update through if the interval has elapsed, recording it
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        if !self.is_ready(now_ms) {
            return false;
        }
        self.last_emit_ms = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_emit_ms = None;
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_always_passes() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        assert!(limiter.try_acquire(1_000));
    }

    #[test]
    fn updates_inside_interval_are_refused() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        assert!(limiter.try_acquire(0));
        assert!(!limiter.try_acquire(10));
        assert!(!limiter.try_acquire(49));
        assert!(limiter.try_acquire(50));
        assert!(!limiter.try_acquire(60));
    }

    #[test]
    fn clock_going_backwards_is_refused() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        assert!(limiter.try_acquire(500));
        assert!(!limiter.try_acquire(100));
    }

    #[test]
    fn reset_reopens_gate() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        assert!(limiter.try_acquire(0));
        limiter.reset();
        assert!(limiter.try_acquire(1));
    }
}
