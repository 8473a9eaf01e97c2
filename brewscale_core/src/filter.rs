//! Trimmed moving average over gram samples.
//!
//! Steady mode keeps a FIFO window of up to `capacity` samples and reports the
//! mean after discarding the single lowest and single highest sample, which
//! rejects one-off spikes such as a corrupted amplifier read. Settling mode
//! (entered through `prefill`) overwrites the whole window with each incoming
//! sample for a fixed number of pushes so a genuine load change shows up
//! immediately instead of drifting in over a full window.
use std::collections::VecDeque;

/// Windows shorter than this are averaged without trimming.
pub const MIN_TRIM_LEN: usize = 4;

#[derive(Debug, Clone)]
pub struct TrimmedMovingAverage {
    capacity: usize,
    buf: VecDeque<f32>,
    prefill_remaining: u32,
}

impl TrimmedMovingAverage {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity + 1),
            prefill_remaining: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Pushes left in the current settling phase.
    #[inline]
    pub fn prefill_remaining(&self) -> u32 {
        self.prefill_remaining
    }

    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.buf.iter().copied()
    }

    /// Add a sample and return the filtered value.
    pub fn push(&mut self, sample: f32) -> f32 {
        if self.prefill_remaining > 0 {
            self.buf.iter_mut().for_each(|s| *s = sample);
            self.prefill_remaining -= 1;
            return sample;
        }
        self.buf.push_back(sample);
        if self.buf.len() > self.capacity {
            self.buf.pop_front();
        }
        self.value().unwrap_or(sample)
    }

    /// Current filtered value; `None` while the window is empty.
    pub fn value(&self) -> Option<f32> {
        let n = self.buf.len();
        if n == 0 {
            return None;
        }
        let sum: f32 = self.buf.iter().sum();
        if n < MIN_TRIM_LEN {
            return Some(sum / n as f32);
        }
        // Dropping one min and one max is the same as sorting and trimming both ends.
        let (min, max) = self
            .buf
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        Some((sum - min - max) / (n - 2) as f32)
    }

    /// Snap the window to `sample` and keep overwriting it for `cycles` pushes.
    ///
    /// An empty window is filled to capacity; otherwise its length is kept.
    pub fn prefill(&mut self, sample: f32, cycles: u32) {
        if self.buf.is_empty() {
            self.buf.resize(self.capacity, sample);
        } else {
            self.buf.iter_mut().for_each(|s| *s = sample);
        }
        self.prefill_remaining = cycles;
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.prefill_remaining = 0;
    }
}

impl Default for TrimmedMovingAverage {
    fn default() -> Self {
        Self::new(16)
    }
}
