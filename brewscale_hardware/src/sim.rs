//! Simulated hardware.
//!
//! `SimulatedLoadCell` emulates the HX711 side of the two-wire protocol, so the
//! real bit-banged driver runs unchanged against it: DOUT reports "ready" while
//! a conversion is queued, shifts the word out MSB first on each rising PD_SCK
//! edge, and counts the trailing gain pulses of every transaction.
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use brewscale_traits::{Button, InputLine, OutputLine};

use crate::hx711::{Gain, Hx711};

const DATA_BITS: u32 = 24;

#[derive(Default)]
struct AdcState {
    queue: VecDeque<i32>,
    source: Option<Box<dyn FnMut() -> i32>>,
    stalled: bool,
    word: Option<u32>,
    pulses: u32,
    clock_high: bool,
    gain_log: Vec<u8>,
}

impl AdcState {
    fn has_next(&self) -> bool {
        !self.stalled && (!self.queue.is_empty() || self.source.is_some())
    }

    fn next_word(&mut self) -> Option<u32> {
        let v = match self.queue.pop_front() {
            Some(v) => v,
            None => (self.source.as_mut()?)(),
        };
        Some((v as u32) & 0xFF_FFFF)
    }

    /// Close a transaction once the driver has issued its gain pulses.
    fn settle(&mut self) {
        if self.pulses > DATA_BITS {
            self.gain_log.push((self.pulses - DATA_BITS) as u8);
            self.word = None;
            self.pulses = 0;
        }
    }
}

/// Shared handle to the simulated amplifier.
#[derive(Clone, Default)]
pub struct SimulatedLoadCell {
    state: Rc<RefCell<AdcState>>,
}

impl SimulatedLoadCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one conversion result (low 24 bits are transmitted).
    pub fn push_raw(&self, raw: i32) {
        self.state.borrow_mut().queue.push_back(raw);
    }

    pub fn extend_raw(&self, raws: impl IntoIterator<Item = i32>) {
        self.state.borrow_mut().queue.extend(raws);
    }

    /// Produce conversions on demand once the queue is drained.
    pub fn set_source(&self, source: impl FnMut() -> i32 + 'static) {
        self.state.borrow_mut().source = Some(Box::new(source));
    }

    /// A stalled amplifier keeps DOUT high forever.
    pub fn set_stalled(&self, stalled: bool) {
        self.state.borrow_mut().stalled = stalled;
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Gain pulses observed after each completed transaction, oldest first.
    pub fn gain_pulses(&self) -> Vec<u8> {
        let mut st = self.state.borrow_mut();
        st.settle();
        st.gain_log.clone()
    }

    pub fn lines(&self) -> (SimDout, SimSck) {
        (
            SimDout {
                state: self.state.clone(),
            },
            SimSck {
                state: self.state.clone(),
            },
        )
    }

    /// Driver wired to this simulator, polling without sleeps.
    pub fn hx711(&self, gain: Gain) -> Hx711<SimDout, SimSck> {
        let (dout, sck) = self.lines();
        Hx711::new(dout, sck, gain).with_poll_interval(std::time::Duration::ZERO)
    }
}

pub struct SimDout {
    state: Rc<RefCell<AdcState>>,
}

impl InputLine for SimDout {
    fn is_high(&self) -> bool {
        let mut st = self.state.borrow_mut();
        st.settle();
        match st.word {
            Some(word) if (1..=DATA_BITS).contains(&st.pulses) => {
                (word >> (DATA_BITS - st.pulses)) & 1 == 1
            }
            Some(_) => true,
            None => !st.has_next(),
        }
    }
}

pub struct SimSck {
    state: Rc<RefCell<AdcState>>,
}

impl OutputLine for SimSck {
    fn set_high(&mut self) {
        let mut st = self.state.borrow_mut();
        if st.clock_high {
            return;
        }
        st.clock_high = true;
        if st.word.is_none() {
            if !st.has_next() {
                // Clocking an idle chip shifts nothing out.
                return;
            }
            st.word = st.next_word();
        }
        st.pulses += 1;
    }

    fn set_low(&mut self) {
        self.state.borrow_mut().clock_high = false;
    }
}

/// Button whose state is driven from the outside (tests, simulated runs).
#[derive(Clone, Default)]
pub struct SimulatedButton {
    pressed: Rc<Cell<bool>>,
}

impl SimulatedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

impl Button for SimulatedButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_line_is_high_until_a_conversion_is_queued() {
        let cell = SimulatedLoadCell::new();
        let (dout, _sck) = cell.lines();
        assert!(dout.is_high());
        cell.push_raw(42);
        assert!(dout.is_low());
    }

    #[test]
    fn stalled_cell_never_becomes_ready() {
        let cell = SimulatedLoadCell::new();
        cell.push_raw(1);
        cell.set_stalled(true);
        let (dout, _sck) = cell.lines();
        assert!(dout.is_high());
    }

    #[test]
    fn shifts_msb_first_on_rising_edges() {
        let cell = SimulatedLoadCell::new();
        cell.push_raw(0x80_0001);
        let (dout, mut sck) = cell.lines();
        let mut bits = Vec::new();
        for _ in 0..24 {
            sck.set_high();
            bits.push(dout.is_high());
            sck.set_low();
        }
        assert!(bits[0]);
        assert!(bits[1..23].iter().all(|b| !b));
        assert!(bits[23]);
    }

    #[test]
    fn source_feeds_after_queue_drains() {
        let cell = SimulatedLoadCell::new();
        let mut n = 0;
        cell.set_source(move || {
            n += 1;
            n
        });
        let mut hx = cell.hx711(Gain::A128);
        assert_eq!(hx.read_with_timeout(std::time::Duration::from_millis(5)).unwrap(), 1);
        assert_eq!(hx.read_with_timeout(std::time::Duration::from_millis(5)).unwrap(), 2);
    }

    #[test]
    fn simulated_button_shares_state_between_clones() {
        let handle = SimulatedButton::new();
        let mut button = handle.clone();
        assert!(!button.is_pressed());
        handle.press();
        assert!(button.is_pressed());
        handle.release();
        assert!(!button.is_pressed());
    }
}
