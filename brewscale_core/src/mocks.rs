//! Test and helper mocks for brewscale_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use brewscale_traits::{Clock, RenderSink, Scale};

/// Scale that replays queued raw counts.
///
/// Once the queue is drained it repeats the held value if one was given,
/// otherwise every read fails with a timeout.
#[derive(Debug, Default, Clone)]
pub struct ScriptedScale {
    reads: VecDeque<i32>,
    hold: Option<i32>,
}

impl ScriptedScale {
    pub fn new(reads: impl IntoIterator<Item = i32>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            hold: None,
        }
    }

    pub fn holding(raw: i32) -> Self {
        Self {
            reads: VecDeque::new(),
            hold: Some(raw),
        }
    }

    pub fn push(&mut self, raw: i32) {
        self.reads.push_back(raw);
    }

    pub fn set_hold(&mut self, raw: Option<i32>) {
        self.hold = raw;
    }
}

impl Scale for ScriptedScale {
    fn read(&mut self, _timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        self.reads
            .pop_front()
            .or(self.hold)
            .ok_or_else(|| "scripted scale: sensor timeout".into())
    }
}

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + offset
/// sleep(d) advances internal time by d without actually sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Set the absolute offset relative to origin.
    pub fn set_offset(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = d;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

/// One rendered frame as seen by `RecordingSink`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub time_text: String,
    pub weight_text: String,
    pub weight_g: f32,
}

/// Sink that keeps every frame it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<Rendered>,
}

impl RenderSink for RecordingSink {
    fn render(
        &mut self,
        time_text: &str,
        weight_text: &str,
        weight_g: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.frames.push(Rendered {
            time_text: time_text.to_string(),
            weight_text: weight_text.to_string(),
            weight_g,
        });
        Ok(())
    }
}
