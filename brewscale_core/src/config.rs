//! Runtime configuration for the controller and runner.
//!
//! These are separate from the TOML-deserialized config in `brewscale_config`;
//! see `conversions` for the mapping.

/// Filter pipeline tuning.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Trimmed moving average window (samples).
    pub window: usize,
    /// Deviation from the average that counts toward a load step.
    pub step_threshold_g: f32,
    /// Pushes that overwrite the window after a confirmed step.
    pub prefill_cycles: u32,
    /// Minimum change before the displayed value moves.
    pub display_hysteresis_g: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            window: 16,
            step_threshold_g: 0.8,
            prefill_cycles: 6,
            display_hysteresis_g: 0.2,
        }
    }
}

/// Timer button handling.
#[derive(Debug, Clone)]
pub struct TimerCfg {
    pub long_press_ms: u64,
    pub debounce_ms: u64,
    /// Tare as well when a long press resets the timer.
    pub reset_tares: bool,
}

impl Default for TimerCfg {
    fn default() -> Self {
        Self {
            long_press_ms: 1500,
            debounce_ms: 20,
            reset_tares: true,
        }
    }
}

/// Raw acquisition.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    pub tare_samples: usize,
    pub sample_average: usize,
    /// Max sensor wait per read (ms)
    pub read_timeout_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            tare_samples: 15,
            sample_average: 3,
            read_timeout_ms: 500,
        }
    }
}

/// Loop pacing and sensor-failure policy.
#[derive(Debug, Clone)]
pub struct RunnerCfg {
    pub refresh_ms: u64,
    /// Abort after this many timeouts in a row; 0 retries forever.
    pub max_consecutive_timeouts: u32,
    pub action_pause_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            refresh_ms: 10,
            max_consecutive_timeouts: 50,
            action_pause_ms: 300,
        }
    }
}
