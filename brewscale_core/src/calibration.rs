//! Raw counts to grams.
//!
//! grams = -(average(raw) - offset) * factor
//!
//! The minus sign makes added load read positive with the amplifier wired as
//! on the device; flip the sign of `factor` for reversed wiring.
use std::time::Duration;

use brewscale_traits::Scale;
use eyre::WrapErr;
use tracing::info;

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Static calibration: grams per raw count.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            factor: brewscale_config::DEFAULT_CALIBRATION_FACTOR,
        }
    }
}

/// Calibration plus the session's tare offset.
#[derive(Debug, Clone)]
pub struct Calibrator {
    factor: f32,
    offset: i32,
}

impl Calibrator {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            factor: calibration.factor,
            offset: 0,
        }
    }

    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[inline]
    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Zero the scale on the current load; returns the new offset.
    pub fn tare<S: Scale + ?Sized>(
        &mut self,
        scale: &mut S,
        times: usize,
        timeout: Duration,
    ) -> Result<i32> {
        let offset = read_average(scale, times, timeout).wrap_err("taring scale")?;
        self.offset = offset;
        info!(offset, samples = times, "tare complete");
        Ok(offset)
    }

    /// Averaged raw reading relative to the tare offset.
    pub fn get_value<S: Scale + ?Sized>(
        &self,
        scale: &mut S,
        times: usize,
        timeout: Duration,
    ) -> Result<i32> {
        let avg = read_average(scale, times, timeout).wrap_err("reading scale")?;
        Ok(avg.saturating_sub(self.offset))
    }

    /// Convert a tared raw value to grams.
    #[inline]
    pub fn to_grams(&self, value: i32) -> f32 {
        -(value as f32) * self.factor
    }

    pub fn get_weight<S: Scale + ?Sized>(
        &self,
        scale: &mut S,
        times: usize,
        timeout: Duration,
    ) -> Result<f32> {
        self.get_value(scale, times, timeout)
            .map(|v| self.to_grams(v))
    }
}

fn read_average<S: Scale + ?Sized>(scale: &mut S, times: usize, timeout: Duration) -> Result<i32> {
    scale
        .read_average(times, timeout)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
}
