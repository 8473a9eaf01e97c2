//! Hardware seams shared by the brew scale crates.
//!
//! The core never touches GPIO directly: the amplifier, the buttons and the
//! display are all reached through the traits below, so the same control loop
//! runs against real pins, the simulator, or test doubles.
pub mod clock;
pub mod lines;

pub use clock::{Clock, MonotonicClock};
pub use lines::{Button, InputLine, OutputLine};

use std::time::Duration;

/// A source of signed raw load-cell counts.
pub trait Scale {
    /// Wait (at most `timeout`) for the next conversion and return it.
    fn read(&mut self, timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;

    /// Mean of `times` consecutive reads, using floor division on the sum.
    ///
    /// `times` is clamped to at least 1. The first failing read aborts the
    /// average and its error is returned unchanged.
    fn read_average(
        &mut self,
        times: usize,
        timeout: Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let times = times.max(1);
        let mut sum: i64 = 0;
        for _ in 0..times {
            sum += i64::from(self.read(timeout)?);
        }
        // The mean of i32 values always fits back into i32.
        Ok(sum.div_euclid(times as i64) as i32)
    }
}

/// Receives the two rendered strings once per loop iteration.
pub trait RenderSink {
    fn render(
        &mut self,
        time_text: &str,
        weight_text: &str,
        weight_g: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Seq(VecDeque<i32>);

    impl Scale for Seq {
        fn read(
            &mut self,
            _timeout: Duration,
        ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
            self.0.pop_front().ok_or_else(|| "sequence exhausted".into())
        }
    }

    #[test]
    fn read_average_floors_toward_negative_infinity() {
        let mut s = Seq(VecDeque::from(vec![-1, -2]));
        assert_eq!(s.read_average(2, Duration::from_millis(1)).unwrap(), -2);

        let mut s = Seq(VecDeque::from(vec![1, 2]));
        assert_eq!(s.read_average(2, Duration::from_millis(1)).unwrap(), 1);
    }

    #[test]
    fn read_average_clamps_zero_times_to_one() {
        let mut s = Seq(VecDeque::from(vec![7, 100]));
        assert_eq!(s.read_average(0, Duration::from_millis(1)).unwrap(), 7);
    }

    #[test]
    fn read_average_propagates_first_error() {
        let mut s = Seq(VecDeque::from(vec![5]));
        let err = s.read_average(3, Duration::from_millis(1)).unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }
}
