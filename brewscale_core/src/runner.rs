//! The refresh loop: step the controller, render, pace.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brewscale_traits::{RenderSink, Scale};
use eyre::WrapErr;
use tracing::{debug, error, warn};

use crate::config::RunnerCfg;
use crate::controller::{Frame, ScaleController};
use crate::error::{Result, ScaleError, is_sensor_timeout};
use crate::timer::TimerEvent;

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Loop iterations, including ones lost to sensor timeouts.
    pub cycles: u64,
    /// Frames handed to the sink.
    pub frames: u64,
    pub timeouts: u64,
    /// Re-zeros after startup (button or timer reset).
    pub tares: u64,
}

/// Render one frame, mapping sink failures into the core error type.
pub fn render_frame(sink: &mut dyn RenderSink, frame: &Frame) -> Result<()> {
    sink.render(&frame.time_text, &frame.weight_text, frame.displayed_g)
        .map_err(|e| eyre::Report::new(ScaleError::Render(e.to_string())))
}

/// Tare, then loop until `shutdown` is set or `max_cycles` iterations ran.
///
/// A sensor timeout skips the iteration; `max_consecutive_timeouts` in a row
/// (when non-zero) aborts with the timeout error. Any other error aborts
/// immediately.
pub fn run<S: Scale>(
    controller: &mut ScaleController<S>,
    sink: &mut dyn RenderSink,
    cfg: &RunnerCfg,
    shutdown: &AtomicBool,
    max_cycles: Option<u64>,
) -> Result<RunStats> {
    controller.begin().wrap_err("startup tare")?;

    let refresh = Duration::from_millis(cfg.refresh_ms);
    let action_pause = Duration::from_millis(cfg.action_pause_ms);
    let mut stats = RunStats::default();
    let mut consecutive_timeouts: u32 = 0;

    while !shutdown.load(Ordering::Relaxed) {
        if max_cycles.is_some_and(|max| stats.cycles >= max) {
            break;
        }
        stats.cycles += 1;

        match controller.step() {
            Ok(frame) => {
                consecutive_timeouts = 0;
                render_frame(sink, &frame)?;
                stats.frames += 1;
                debug!(
                    raw = frame.raw_value,
                    grams = frame.weight_g,
                    filtered = frame.filtered_g,
                    shown = %frame.weight_text,
                    time = %frame.time_text,
                    "frame"
                );
                if frame.tared {
                    stats.tares += 1;
                }
                if frame.tared || frame.timer_event == Some(TimerEvent::Reset) {
                    controller.clock().sleep(action_pause);
                }
            }
            Err(e) if is_sensor_timeout(&e) => {
                stats.timeouts += 1;
                consecutive_timeouts = consecutive_timeouts.saturating_add(1);
                warn!(consecutive = consecutive_timeouts, "sensor timeout; skipping cycle");
                if cfg.max_consecutive_timeouts > 0
                    && consecutive_timeouts >= cfg.max_consecutive_timeouts
                {
                    error!(consecutive = consecutive_timeouts, "sensor not responding; giving up");
                    return Err(e.wrap_err(format!(
                        "{consecutive_timeouts} consecutive sensor timeouts"
                    )));
                }
            }
            Err(e) => return Err(e),
        }

        controller.clock().sleep(refresh);
    }

    Ok(stats)
}
