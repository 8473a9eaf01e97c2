//! `From` implementations bridging `brewscale_config` types to `brewscale_core` types.

use crate::calibration::Calibration;
use crate::config::{FilterCfg, RunnerCfg, SamplingCfg, TimerCfg};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&brewscale_config::FilterCfg> for FilterCfg {
    fn from(c: &brewscale_config::FilterCfg) -> Self {
        Self {
            window: c.window,
            step_threshold_g: c.step_threshold_g,
            prefill_cycles: c.prefill_cycles,
            display_hysteresis_g: c.display_hysteresis_g,
        }
    }
}

// ── TimerCfg ─────────────────────────────────────────────────────────────────

impl From<&brewscale_config::TimerCfg> for TimerCfg {
    fn from(c: &brewscale_config::TimerCfg) -> Self {
        Self {
            long_press_ms: c.long_press_ms,
            debounce_ms: c.debounce_ms,
            reset_tares: c.reset_tares,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&brewscale_config::Config> for SamplingCfg {
    fn from(c: &brewscale_config::Config) -> Self {
        Self {
            tare_samples: c.calibration.tare_samples,
            sample_average: c.calibration.sample_average,
            read_timeout_ms: c.hx711.read_timeout_ms,
        }
    }
}

// ── RunnerCfg ────────────────────────────────────────────────────────────────

impl From<&brewscale_config::RunnerCfg> for RunnerCfg {
    fn from(c: &brewscale_config::RunnerCfg) -> Self {
        Self {
            refresh_ms: c.refresh_ms,
            max_consecutive_timeouts: c.max_consecutive_timeouts,
            action_pause_ms: c.action_pause_ms,
        }
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&brewscale_config::CalibrationCfg> for Calibration {
    fn from(c: &brewscale_config::CalibrationCfg) -> Self {
        Self { factor: c.factor }
    }
}
