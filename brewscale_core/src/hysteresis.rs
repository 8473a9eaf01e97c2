//! Dead band for the displayed weight.

#[derive(Debug, Clone)]
pub struct DisplayHysteresis {
    threshold_g: f32,
    last: Option<f32>,
}

impl DisplayHysteresis {
    pub fn new(threshold_g: f32) -> Self {
        Self {
            threshold_g,
            last: None,
        }
    }

    #[inline]
    pub fn last(&self) -> Option<f32> {
        self.last
    }

    /// Value to display for `proposed`: the previous one unless it moved by at
    /// least the threshold.
    ///
    /// The band is open on both sides: a move of exactly the threshold, up or
    /// down, is adopted.
    pub fn decide(&mut self, proposed: f32) -> f32 {
        match self.last {
            Some(last) if (proposed - last).abs() < self.threshold_g => last,
            _ => {
                self.last = Some(proposed);
                proposed
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DisplayHysteresis {
    fn default() -> Self {
        Self::new(0.2)
    }
}
