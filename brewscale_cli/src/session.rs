//! Config mapping, hardware assembly, and the command bodies.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use brewscale_config::Config;
use brewscale_core::error::Result as CoreResult;
use brewscale_core::hw_error::map_hw_error;
use brewscale_core::{Calibrator, RunStats, RunnerCfg, ScaleController};
use brewscale_hardware::Gain;
use brewscale_traits::{Button, Scale};
use eyre::WrapErr;

use crate::sink::ConsoleSink;

fn gain(cfg: &Config) -> CoreResult<Gain> {
    Gain::try_from(cfg.hx711.gain).map_err(|e| eyre::Report::new(map_hw_error(&e)))
}

fn read_timeout(cfg: &Config) -> Duration {
    Duration::from_millis(cfg.hx711.read_timeout_ms)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_amplifier(cfg: &Config) -> CoreResult<impl Scale + 'static> {
    let gain = gain(cfg)?;
    tracing::info!(
        dt = cfg.pins.hx711_dt,
        sck = cfg.pins.hx711_sck,
        gain = gain.value(),
        "opening hx711"
    );
    brewscale_hardware::gpio::open_hx711(
        cfg.pins.hx711_dt,
        cfg.pins.hx711_sck,
        gain,
        read_timeout(cfg),
        Duration::from_micros(cfg.hx711.poll_interval_us),
    )
    .map_err(|e| eyre::Report::new(map_hw_error(&e)))
    .wrap_err("open hx711")
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_buttons(cfg: &Config) -> CoreResult<(impl Button + 'static, impl Button + 'static)> {
    let open = |pin: u8| {
        brewscale_hardware::gpio::open_button(pin)
            .map_err(|e| eyre::Report::new(map_hw_error(&e)))
            .wrap_err_with(|| format!("open button pin {pin}"))
    };
    Ok((open(cfg.pins.tare_button)?, open(cfg.pins.timer_button)?))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
use simulated::{open_amplifier, open_buttons};

/// Simulated backend used when the binary is built without GPIO support.
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
mod simulated {
    use super::*;

    /// Raw counts the simulated amplifier reports for an empty platform.
    const SIM_EMPTY_RAW: i32 = 120_000;
    /// Reads before the simulated cup lands (startup tare plus a short idle).
    const SIM_CUP_AT_READ: u64 = 60;
    const SIM_CUP_G: f32 = 250.0;
    /// Reads after the cup before the simulated pour starts.
    const SIM_POUR_DELAY_READS: u64 = 90;
    const SIM_POUR_G_PER_READ: f32 = 0.3;
    const SIM_POUR_MAX_G: f32 = 36.0;
    /// When set to "1", the simulated amplifier never signals data-ready.
    const SIM_TIMEOUT_ENV: &str = "BREWSCALE_SIM_TIMEOUT";

    pub(super) fn open_amplifier(cfg: &Config) -> CoreResult<impl Scale + 'static> {
        let gain = gain(cfg)?;
        let cell = simulated_load_cell(cfg.calibration.factor);
        if std::env::var(SIM_TIMEOUT_ENV).is_ok_and(|v| v == "1") {
            cell.set_stalled(true);
        }
        tracing::info!(gain = gain.value(), "using simulated hx711");
        let mut hx = cell.hx711(gain).with_ready_timeout(read_timeout(cfg));
        hx.set_gain(gain)
            .map_err(|e| eyre::Report::new(map_hw_error(&e)))
            .wrap_err("open hx711")?;
        Ok(hx)
    }

    pub(super) fn open_buttons(
        _cfg: &Config,
    ) -> CoreResult<(impl Button + 'static, impl Button + 'static)> {
        Ok((
            brewscale_hardware::SimulatedButton::new(),
            brewscale_hardware::SimulatedButton::new(),
        ))
    }

    /// Deterministic load profile: empty, then a cup, then a slow pour.
    fn simulated_load_cell(factor: f32) -> brewscale_hardware::SimulatedLoadCell {
        let cell = brewscale_hardware::SimulatedLoadCell::new();
        let mut read: u64 = 0;
        let mut noise: u32 = 0x9E37_79B9;
        cell.set_source(move || {
            let grams = if read < SIM_CUP_AT_READ {
                0.0
            } else {
                let pour_reads = read.saturating_sub(SIM_CUP_AT_READ + SIM_POUR_DELAY_READS);
                SIM_CUP_G + (pour_reads as f32 * SIM_POUR_G_PER_READ).min(SIM_POUR_MAX_G)
            };
            read += 1;

            // xorshift, +-2 counts
            noise ^= noise << 13;
            noise ^= noise >> 17;
            noise ^= noise << 5;
            let jitter = (noise % 5) as i32 - 2;

            // Load pulls the raw value down; the calibrator flips it back.
            let counts = (grams / factor).round() as i32;
            SIM_EMPTY_RAW.saturating_sub(counts).saturating_add(jitter)
        });
        cell
    }
}

fn build_controller<S: Scale>(
    cfg: &Config,
    scale: S,
    tare_button: impl Button + 'static,
    timer_button: impl Button + 'static,
) -> CoreResult<ScaleController<S>> {
    ScaleController::builder()
        .with_scale(scale)
        .with_tare_button(tare_button)
        .with_timer_button(timer_button)
        .with_calibration((&cfg.calibration).into())
        .with_filter((&cfg.filter).into())
        .with_timer((&cfg.timer).into())
        .with_sampling(cfg.into())
        .build()
}

/// Tare and run the refresh loop until Ctrl-C or `cycles` iterations.
pub fn run_scale(
    cfg: &Config,
    cycles: Option<u64>,
    json: bool,
    shutdown: &AtomicBool,
) -> CoreResult<RunStats> {
    let scale = open_amplifier(cfg)?;
    let (tare_button, timer_button) = open_buttons(cfg)?;
    let mut controller = build_controller(cfg, scale, tare_button, timer_button)?;
    let runner: RunnerCfg = (&cfg.runner).into();

    let mut sink = ConsoleSink::new(std::io::stdout().lock(), json);
    tracing::info!(
        refresh_ms = runner.refresh_ms,
        factor = cfg.calibration.factor,
        cycles = ?cycles,
        "scale start"
    );
    let result = brewscale_core::run(&mut controller, &mut sink, &runner, shutdown, cycles);
    sink.finish().wrap_err("flush console")?;

    let stats = result?;
    tracing::info!(
        cycles = stats.cycles,
        frames = stats.frames,
        timeouts = stats.timeouts,
        tares = stats.tares,
        "scale stopped"
    );
    Ok(stats)
}

/// One bounded read; returns the raw value.
pub fn self_check(cfg: &Config) -> CoreResult<i32> {
    let mut scale = open_amplifier(cfg)?;
    let raw = scale
        .read(read_timeout(cfg))
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err("self-check read")?;
    tracing::info!(raw, "self-check ok");
    Ok(raw)
}

/// Averaged raw reading of the current load, as a tare would record it.
pub fn tare_offset(cfg: &Config, samples: Option<usize>) -> CoreResult<i32> {
    let mut scale = open_amplifier(cfg)?;
    let samples = samples.unwrap_or(cfg.calibration.tare_samples).max(1);
    let mut calibrator = Calibrator::new((&cfg.calibration).into());
    calibrator.tare(&mut scale, samples, read_timeout(cfg))
}
