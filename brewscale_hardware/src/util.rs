use std::time::{Duration, Instant};

use brewscale_traits::InputLine;

use crate::error::{HwError, Result};

/// Poll `dout` until the amplifier pulls it low, giving up after `timeout`.
///
/// Returns how long the line stayed high. A zero `poll_interval` spins.
pub fn wait_for_ready<L: InputLine + ?Sized>(
    dout: &L,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Duration> {
    let start = Instant::now();
    while dout.is_high() {
        let waited = start.elapsed();
        if waited >= timeout {
            return Err(HwError::DataReadyTimeout(waited));
        }
        if poll_interval.is_zero() {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(poll_interval.min(timeout - waited));
        }
    }
    Ok(start.elapsed())
}
