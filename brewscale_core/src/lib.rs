#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core scale logic (hardware-agnostic).
//!
//! All hardware interactions go through `brewscale_traits::Scale`,
//! `brewscale_traits::Button` and `brewscale_traits::RenderSink`.
//!
//! ## Architecture
//!
//! - **Calibration**: tare offset and raw→grams conversion (`calibration`)
//! - **Filtering**: trimmed moving average with step prefill (`filter`, `step`)
//! - **Display**: dead band and text formatting (`hysteresis`, `format`)
//! - **Timer**: debounced single-button brew timer (`timer`, `debounce`)
//! - **Control**: one loop iteration per `ScaleController::step` (`controller`)
//! - **Loop**: pacing, rendering and timeout policy (`runner`)

pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod format;
pub mod hw_error;
pub mod hysteresis;
pub mod mocks;
pub mod runner;
pub mod step;
pub mod timer;

pub use calibration::{Calibration, Calibrator};
pub use config::{FilterCfg, RunnerCfg, SamplingCfg, TimerCfg};
pub use controller::{Frame, Reading, ScaleController, ScaleControllerBuilder};
pub use error::{BuildError, Report, Result, ScaleError, is_sensor_timeout};
pub use filter::TrimmedMovingAverage;
pub use format::{format_elapsed, format_weight};
pub use hysteresis::DisplayHysteresis;
pub use runner::{RunStats, run};
pub use step::StepDetector;
pub use timer::{BrewTimer, TimerEvent, TimerState};
