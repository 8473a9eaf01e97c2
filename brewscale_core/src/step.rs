//! Load-step detection.
//!
//! A step is confirmed only when two consecutive samples each deviate from the
//! current filtered value by more than the threshold; a single noisy read never
//! counts.

#[derive(Debug, Clone)]
pub struct StepDetector {
    threshold_g: f32,
    prev_exceeded: bool,
}

impl StepDetector {
    pub fn new(threshold_g: f32) -> Self {
        Self {
            threshold_g,
            prev_exceeded: false,
        }
    }

    /// Whether the previous comparison exceeded the threshold.
    #[inline]
    pub fn armed(&self) -> bool {
        self.prev_exceeded
    }

    /// Compare `sample` against the current average; true on a confirmed step.
    pub fn check(&mut self, sample: f32, current_avg: Option<f32>) -> bool {
        let Some(avg) = current_avg else {
            self.prev_exceeded = false;
            return false;
        };
        let exceeded = (sample - avg).abs() > self.threshold_g;
        let is_step = exceeded && self.prev_exceeded;
        self.prev_exceeded = exceeded;
        is_step
    }

    pub fn reset(&mut self) {
        self.prev_exceeded = false;
    }
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(0.8)
    }
}
