//! Bit-banged HX711 load-cell amplifier driver.
//!
//! One transaction is 24 data pulses on PD_SCK (MSB first, DOUT sampled while
//! the clock is high) followed by 1..=3 extra pulses that select the gain of
//! the *next* conversion. DOUT low means a conversion is ready.
use std::time::Duration;

use brewscale_traits::{InputLine, OutputLine, Scale};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::wait_for_ready;

const DATA_BITS: u32 = 24;
const SIGN_BIT: u32 = 0x80_0000;
const DATA_MASK: u32 = 0xFF_FFFF;

/// Amplifier gain / channel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gain {
    /// Channel A, gain 128.
    #[default]
    A128,
    /// Channel A, gain 64.
    A64,
    /// Channel B, gain 32.
    B32,
}

impl Gain {
    /// Extra clock pulses issued after the 24 data bits.
    #[inline]
    pub fn pulses(self) -> u8 {
        match self {
            Gain::A128 => 1,
            Gain::B32 => 2,
            Gain::A64 => 3,
        }
    }

    #[inline]
    pub fn value(self) -> u16 {
        match self {
            Gain::A128 => 128,
            Gain::A64 => 64,
            Gain::B32 => 32,
        }
    }
}

impl TryFrom<u16> for Gain {
    type Error = HwError;

    fn try_from(v: u16) -> Result<Self> {
        match v {
            128 => Ok(Gain::A128),
            64 => Ok(Gain::A64),
            32 => Ok(Gain::B32),
            other => Err(HwError::InvalidGain(other)),
        }
    }
}

/// Sign-extend a 24-bit two's-complement word into a native i32.
#[inline]
pub fn sign_extend_24(word: u32) -> i32 {
    let word = word & DATA_MASK;
    if word & SIGN_BIT != 0 {
        (word | !DATA_MASK) as i32
    } else {
        word as i32
    }
}

pub struct Hx711<D, C> {
    dout: D,
    sck: C,
    gain: Gain,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl<D: InputLine, C: OutputLine> Hx711<D, C> {
    pub fn new(dout: D, mut sck: C, gain: Gain) -> Self {
        sck.set_low(); // clock idle low
        Self {
            dout,
            sck,
            gain,
            ready_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_micros(10),
        }
    }

    /// Default wait used by `set_gain`'s latching read.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[inline]
    pub fn gain(&self) -> Gain {
        self.gain
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.dout.is_low()
    }

    /// Change the gain and perform one read so it applies from the next conversion on.
    pub fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.gain = gain;
        self.read_with_timeout(self.ready_timeout).map(|_| ())
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let waited = wait_for_ready(&self.dout, timeout, self.poll_interval)?;

        // Clock out 24 bits
        let mut word: u32 = 0;
        for _ in 0..DATA_BITS {
            self.sck.set_high();
            spin_delay_100ns();
            word = (word << 1) | u32::from(self.dout.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Pulse gain to set next measurement
        for _ in 0..self.gain.pulses() {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        let value = sign_extend_24(word);
        trace!(
            raw = value,
            gain = self.gain.value(),
            waited_us = waited.as_micros() as u64,
            "hx711 raw read"
        );
        Ok(value)
    }
}

impl<D: InputLine, C: OutputLine> Scale for Hx711<D, C> {
    fn read(&mut self, timeout: Duration) -> std::result::Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        self.read_with_timeout(timeout).map_err(Into::into)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}
