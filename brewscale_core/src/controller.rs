//! The per-iteration scale pipeline.
//!
//! `ScaleController` owns every piece of mutable state for a session: the
//! amplifier, the tare offset, the filter window, the step detector, the
//! display dead band and the brew timer. One `step()` is one loop iteration:
//!
//! 1. sample both buttons (timer first, then tare)
//! 2. read and calibrate the averaged raw value
//! 3. step detection against the current filter value, then filter push
//! 4. display hysteresis and text formatting
use std::sync::Arc;
use std::time::{Duration, Instant};

use brewscale_traits::clock::{Clock, MonotonicClock};
use brewscale_traits::{Button, Scale};
use tracing::debug;

use crate::calibration::{Calibration, Calibrator};
use crate::config::{FilterCfg, SamplingCfg, TimerCfg};
use crate::debounce::{Debouncer, Edge};
use crate::error::{BuildError, Result};
use crate::filter::{MIN_TRIM_LEN, TrimmedMovingAverage};
use crate::format::{format_elapsed, format_weight};
use crate::hysteresis::DisplayHysteresis;
use crate::step::StepDetector;
use crate::timer::{BrewTimer, TimerEvent};

/// Everything one iteration produced, for the render sink and for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Averaged raw counts minus the tare offset.
    pub raw_value: i32,
    pub weight_g: f32,
    pub filtered_g: f32,
    pub displayed_g: f32,
    pub step_detected: bool,
    pub weight_text: String,
    pub time_text: String,
    pub timer_running: bool,
    pub elapsed_ms: u64,
    pub timer_event: Option<TimerEvent>,
    /// The scale was re-zeroed during this iteration.
    pub tared: bool,
}

/// Filter pipeline output for one calibrated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub weight_g: f32,
    pub filtered_g: f32,
    pub displayed_g: f32,
    pub step_detected: bool,
}

fn never_pressed() -> Box<dyn Button> {
    Box::new(|| false)
}

pub struct ScaleController<S: Scale> {
    scale: S,
    tare_button: Box<dyn Button>,
    timer_button: Box<dyn Button>,
    tare_debounce: Debouncer,
    /// Set by a tare press or a taring reset; cleared once a tare succeeds.
    pending_tare: bool,
    /// Timer event not yet reported in a frame.
    pending_event: Option<TimerEvent>,

    calibrator: Calibrator,
    filter: TrimmedMovingAverage,
    step: StepDetector,
    display: DisplayHysteresis,
    timer: BrewTimer,

    filter_cfg: FilterCfg,
    timer_cfg: TimerCfg,
    sampling: SamplingCfg,
    read_timeout: Duration,

    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
}

impl<S: Scale> core::fmt::Debug for ScaleController<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScaleController")
            .field("offset", &self.calibrator.offset())
            .field("filter_len", &self.filter.len())
            .field("displayed", &self.display.last())
            .field("timer", self.timer.state())
            .finish()
    }
}

impl<S: Scale> ScaleController<S> {
    pub fn builder() -> ScaleControllerBuilder<S> {
        ScaleControllerBuilder::default()
    }

    /// Tare and clear the pipeline; call once before the first `step()`.
    pub fn begin(&mut self) -> Result<i32> {
        self.tare()
    }

    /// Re-zero on the current load and forget all filter history.
    pub fn tare(&mut self) -> Result<i32> {
        let offset =
            self.calibrator
                .tare(&mut self.scale, self.sampling.tare_samples, self.read_timeout)?;
        self.filter.reset();
        self.step.reset();
        self.display.reset();
        self.pending_tare = false;
        Ok(offset)
    }

    /// One loop iteration.
    pub fn step(&mut self) -> Result<Frame> {
        let now_ms = self.now_ms();

        let timer_pressed = self.timer_button.is_pressed();
        let timer_event = self.timer.update(now_ms, timer_pressed);
        if timer_event.is_some() {
            self.pending_event = timer_event;
        }

        let tare_pressed = self.tare_button.is_pressed();
        if self.tare_debounce.update(tare_pressed, now_ms) == Some(Edge::Pressed) {
            self.pending_tare = true;
        }
        if timer_event == Some(TimerEvent::Reset) && self.timer_cfg.reset_tares {
            self.pending_tare = true;
        }

        // A failed tare stays pending and is retried on the next call.
        let tared = self.pending_tare;
        if tared {
            self.tare()?;
        }

        let raw_value = self.calibrator.get_value(
            &mut self.scale,
            self.sampling.sample_average,
            self.read_timeout,
        )?;
        let reading = self.process_value(raw_value);

        Ok(Frame {
            raw_value,
            weight_g: reading.weight_g,
            filtered_g: reading.filtered_g,
            displayed_g: reading.displayed_g,
            step_detected: reading.step_detected,
            weight_text: format_weight(reading.displayed_g),
            time_text: format_elapsed(self.timer.elapsed_ms()),
            timer_running: self.timer.is_running(),
            elapsed_ms: self.timer.elapsed_ms(),
            timer_event: self.pending_event.take(),
            tared,
        })
    }

    /// Run one tared raw value through calibration and the filter pipeline.
    pub fn process_value(&mut self, raw_value: i32) -> Reading {
        let weight_g = self.calibrator.to_grams(raw_value);
        self.process_grams(weight_g)
    }

    /// Filter pipeline on an already calibrated sample.
    pub fn process_grams(&mut self, weight_g: f32) -> Reading {
        let current_avg = self.filter.value();
        let step_detected = self.step.check(weight_g, current_avg);
        if step_detected {
            debug!(
                sample_g = weight_g,
                avg_g = ?current_avg,
                cycles = self.filter_cfg.prefill_cycles,
                "load step detected; prefilling"
            );
            self.filter.prefill(weight_g, self.filter_cfg.prefill_cycles);
        }
        let filtered_g = self.filter.push(weight_g);
        let displayed_g = self.display.decide(filtered_g);
        Reading {
            weight_g,
            filtered_g,
            displayed_g,
            step_detected,
        }
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.millis_since(self.epoch)
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        &*self.clock
    }

    pub fn timer(&self) -> &BrewTimer {
        &self.timer
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn filter(&self) -> &TrimmedMovingAverage {
        &self.filter
    }

    pub fn displayed(&self) -> Option<f32> {
        self.display.last()
    }

    /// Whether a requested tare is still waiting for a successful read.
    pub fn tare_pending(&self) -> bool {
        self.pending_tare
    }

    pub fn scale_mut(&mut self) -> &mut S {
        &mut self.scale
    }
}

pub struct ScaleControllerBuilder<S> {
    scale: Option<S>,
    tare_button: Option<Box<dyn Button>>,
    timer_button: Option<Box<dyn Button>>,
    calibration: Calibration,
    filter: FilterCfg,
    timer: TimerCfg,
    sampling: SamplingCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl<S> Default for ScaleControllerBuilder<S> {
    fn default() -> Self {
        Self {
            scale: None,
            tare_button: None,
            timer_button: None,
            calibration: Calibration::default(),
            filter: FilterCfg::default(),
            timer: TimerCfg::default(),
            sampling: SamplingCfg::default(),
            clock: None,
        }
    }
}

impl<S: Scale> ScaleControllerBuilder<S> {
    pub fn with_scale(mut self, scale: S) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_tare_button(mut self, button: impl Button + 'static) -> Self {
        self.tare_button = Some(Box::new(button));
        self
    }

    pub fn with_timer_button(mut self, button: impl Button + 'static) -> Self {
        self.timer_button = Some(Box::new(button));
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_timer(mut self, timer: TimerCfg) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingCfg) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and build. Does not touch the amplifier; see `begin()`.
    pub fn build(self) -> Result<ScaleController<S>> {
        let scale = self
            .scale
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;

        let invalid = |msg: &'static str| eyre::Report::new(BuildError::InvalidConfig(msg));
        if !self.calibration.factor.is_finite() || self.calibration.factor == 0.0 {
            return Err(invalid("calibration factor must be finite and non-zero"));
        }
        if self.filter.window < MIN_TRIM_LEN {
            return Err(invalid("filter window must be >= 4"));
        }
        if !(self.filter.step_threshold_g.is_finite() && self.filter.step_threshold_g > 0.0) {
            return Err(invalid("step_threshold_g must be > 0"));
        }
        if !self.filter.display_hysteresis_g.is_finite()
            || self.filter.display_hysteresis_g.is_sign_negative()
        {
            return Err(invalid("display_hysteresis_g must be >= 0"));
        }
        if self.timer.long_press_ms == 0 {
            return Err(invalid("long_press_ms must be >= 1"));
        }
        if self.sampling.tare_samples == 0 || self.sampling.sample_average == 0 {
            return Err(invalid("sample counts must be >= 1"));
        }
        if self.sampling.read_timeout_ms == 0 {
            return Err(invalid("read_timeout_ms must be >= 1"));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let epoch = clock.now();

        Ok(ScaleController {
            scale,
            tare_button: self.tare_button.unwrap_or_else(never_pressed),
            timer_button: self.timer_button.unwrap_or_else(never_pressed),
            tare_debounce: Debouncer::new(self.timer.debounce_ms),
            pending_tare: false,
            pending_event: None,
            calibrator: Calibrator::new(self.calibration),
            filter: TrimmedMovingAverage::new(self.filter.window),
            step: StepDetector::new(self.filter.step_threshold_g),
            display: DisplayHysteresis::new(self.filter.display_hysteresis_g),
            timer: BrewTimer::new(self.timer.long_press_ms, self.timer.debounce_ms),
            read_timeout: Duration::from_millis(self.sampling.read_timeout_ms),
            filter_cfg: self.filter,
            timer_cfg: self.timer,
            sampling: self.sampling,
            clock,
            epoch,
        })
    }
}
