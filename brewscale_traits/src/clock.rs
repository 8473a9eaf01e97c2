use std::time::{Duration, Instant};

/// Time source for the refresh loop, the brew timer and button debouncing.
///
/// Tests drive a manual clock so that long presses and multi-second brews
/// run instantly; the device uses [`MonotonicClock`].
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block the loop for `d`. A manual clock just advances.
    fn sleep(&self, d: Duration);

    /// Whole milliseconds from `start` to now; zero if `start` lies ahead.
    fn millis_since(&self, start: Instant) -> u64 {
        let ms = self.now().saturating_duration_since(start).as_millis();
        u64::try_from(ms).unwrap_or(u64::MAX)
    }
}

/// Wall clock backed by `Instant::now` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_in_the_future_counts_as_zero() {
        let clock = MonotonicClock::new();
        let later = clock.now() + Duration::from_secs(5);
        assert_eq!(clock.millis_since(later), 0);
    }

    #[test]
    fn millis_since_tracks_a_real_sleep() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.millis_since(start) >= 2);
    }
}
