//! Time-based button debouncer.
//!
//! A raw level is accepted only after it has been observed unchanged for
//! `debounce_ms`. With `debounce_ms == 0` every change is accepted on the
//! iteration it is first seen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce_ms: u64,
    stable: bool,
    candidate: bool,
    candidate_since_ms: u64,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            stable: false,
            candidate: false,
            candidate_since_ms: 0,
        }
    }

    /// Debounced level.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Feed one raw sample; returns an edge when the debounced level flips.
    pub fn update(&mut self, raw_pressed: bool, now_ms: u64) -> Option<Edge> {
        if raw_pressed != self.candidate {
            self.candidate = raw_pressed;
            self.candidate_since_ms = now_ms;
        }
        if self.candidate == self.stable
            || now_ms.saturating_sub(self.candidate_since_ms) < self.debounce_ms
        {
            return None;
        }
        self.stable = self.candidate;
        Some(if self.stable {
            Edge::Pressed
        } else {
            Edge::Released
        })
    }
}
