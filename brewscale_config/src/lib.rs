#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the brew scale.
//!
//! Every section has defaults matching the shipped firmware constants, so an
//! empty TOML document is a valid configuration. `Config::validate` rejects
//! values the core cannot run with (including unsupported amplifier gains).
use serde::Deserialize;
use std::path::Path;

/// Default grams per raw count: a 38 g reference mass read as 24 800 counts.
pub const DEFAULT_CALIBRATION_FACTOR: f32 = 38.0 / 24_800.0;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub tare_button: u8,
    pub timer_button: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            hx711_dt: 0,
            hx711_sck: 1,
            tare_button: 2,
            timer_button: 21,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Hx711Cfg {
    /// 128 (channel A), 64 (channel A) or 32 (channel B)
    pub gain: u16,
    /// Max time to wait for data-ready (DT low) before failing a read
    pub read_timeout_ms: u64,
    /// Sleep between data-ready polls
    pub poll_interval_us: u64,
}

impl Default for Hx711Cfg {
    fn default() -> Self {
        Self {
            gain: 128,
            read_timeout_ms: 500,
            poll_interval_us: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// grams per raw count; the core applies the polarity flip on top
    pub factor: f32,
    /// raw reads averaged when taring
    pub tare_samples: usize,
    /// raw reads averaged per loop iteration
    pub sample_average: usize,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            factor: DEFAULT_CALIBRATION_FACTOR,
            tare_samples: 15,
            sample_average: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilterCfg {
    pub window: usize,
    pub step_threshold_g: f32,
    pub prefill_cycles: u32,
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimerCfg {
    pub long_press_ms: u64,
    /// A raw button level must hold this long before it is accepted
    pub debounce_ms: u64,
    /// Re-zero the scale when a long press resets the timer
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    /// Delay after each loop iteration
    pub refresh_ms: u64,
    /// Give up after this many sensor timeouts in a row (0 = never)
    pub max_consecutive_timeouts: u32,
    /// Pause after a tare or timer reset so the button can be released
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

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub hx711: Hx711Cfg,
    pub calibration: CalibrationCfg,
    pub filter: FilterCfg,
    pub timer: TimerCfg,
    pub runner: RunnerCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Amplifier
        if !matches!(self.hx711.gain, 128 | 64 | 32) {
            eyre::bail!(
                "hx711.gain must be 128, 64 or 32 (got {})",
                self.hx711.gain
            );
        }
        if self.hx711.read_timeout_ms == 0 {
            eyre::bail!("hx711.read_timeout_ms must be >= 1");
        }
        if self.pins.hx711_dt == self.pins.hx711_sck {
            eyre::bail!("pins.hx711_dt and pins.hx711_sck must differ");
        }
        if self.pins.tare_button == self.pins.timer_button {
            eyre::bail!("pins.tare_button and pins.timer_button must differ");
        }

        // Calibration
        if !self.calibration.factor.is_finite() || self.calibration.factor == 0.0 {
            eyre::bail!("calibration.factor must be finite and non-zero");
        }
        if self.calibration.tare_samples == 0 {
            eyre::bail!("calibration.tare_samples must be >= 1");
        }
        if self.calibration.sample_average == 0 {
            eyre::bail!("calibration.sample_average must be >= 1");
        }

        // Filter
        if self.filter.window < 4 {
            eyre::bail!("filter.window must be >= 4");
        }
        if !(self.filter.step_threshold_g.is_finite() && self.filter.step_threshold_g > 0.0) {
            eyre::bail!("filter.step_threshold_g must be > 0");
        }
        if !self.filter.display_hysteresis_g.is_finite()
            || self.filter.display_hysteresis_g.is_sign_negative()
        {
            eyre::bail!("filter.display_hysteresis_g must be >= 0");
        }

        // Timer
        if self.timer.long_press_ms == 0 {
            eyre::bail!("timer.long_press_ms must be >= 1");
        }
        if self.timer.debounce_ms >= self.timer.long_press_ms {
            eyre::bail!("timer.debounce_ms must be shorter than timer.long_press_ms");
        }

        // Runner
        if self.runner.refresh_ms > 60_000 {
            eyre::bail!("runner.refresh_ms is unreasonably large (>60s)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be never, daily or hourly (got {rot:?})");
        }

        Ok(())
    }
}
