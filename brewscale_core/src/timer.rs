//! Brew timer: one button, short press toggles, long press resets.
//!
//! Elapsed time advances only by the clock delta between consecutive
//! `update` calls while running. A press held longer than the long-press
//! threshold resets and stops the timer once, while still held; releasing it
//! afterwards does nothing. A release within the threshold toggles.
use tracing::info;

use crate::debounce::{Debouncer, Edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Started,
    Stopped,
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    pub running: bool,
    pub elapsed_ms: u64,
    pub press_started_at: Option<u64>,
    pub long_press_handled: bool,
}

#[derive(Debug, Clone)]
pub struct BrewTimer {
    long_press_ms: u64,
    button: Debouncer,
    state: TimerState,
    last_tick_ms: Option<u64>,
}

impl BrewTimer {
    pub fn new(long_press_ms: u64, debounce_ms: u64) -> Self {
        Self {
            long_press_ms,
            button: Debouncer::new(debounce_ms),
            state: TimerState::default(),
            last_tick_ms: None,
        }
    }

    #[inline]
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms
    }

    /// Advance the clock to `now_ms` and feed the raw button level.
    pub fn update(&mut self, now_ms: u64, raw_pressed: bool) -> Option<TimerEvent> {
        if let Some(prev) = self.last_tick_ms
            && self.state.running
        {
            self.state.elapsed_ms = self
                .state
                .elapsed_ms
                .saturating_add(now_ms.saturating_sub(prev));
        }
        self.last_tick_ms = Some(now_ms);

        match self.button.update(raw_pressed, now_ms) {
            Some(Edge::Pressed) => {
                self.state.press_started_at = Some(now_ms);
                self.state.long_press_handled = false;
                None
            }
            Some(Edge::Released) => self.on_release(now_ms),
            None => self.poll_long_press(now_ms),
        }
    }

    fn on_release(&mut self, now_ms: u64) -> Option<TimerEvent> {
        let event = match self.state.press_started_at {
            Some(start)
                if !self.state.long_press_handled
                    && now_ms.saturating_sub(start) <= self.long_press_ms =>
            {
                self.state.running = !self.state.running;
                let ev = if self.state.running {
                    TimerEvent::Started
                } else {
                    TimerEvent::Stopped
                };
                info!(elapsed_ms = self.state.elapsed_ms, event = ?ev, "timer toggled");
                Some(ev)
            }
            _ => None,
        };
        self.state.press_started_at = None;
        self.state.long_press_handled = false;
        event
    }

    fn poll_long_press(&mut self, now_ms: u64) -> Option<TimerEvent> {
        if !self.button.is_pressed() || self.state.long_press_handled {
            return None;
        }
        let start = self.state.press_started_at?;
        if now_ms.saturating_sub(start) <= self.long_press_ms {
            return None;
        }
        self.state.elapsed_ms = 0;
        self.state.running = false;
        self.state.long_press_handled = true;
        info!("timer reset & stopped");
        Some(TimerEvent::Reset)
    }
}

impl Default for BrewTimer {
    fn default() -> Self {
        Self::new(1500, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hold the button from `at` for `held_ms`, ticking every `step` ms.
    fn press(t: &mut BrewTimer, at: u64, held_ms: u64, step: u64) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        let mut now = at;
        while now < at + held_ms {
            events.extend(t.update(now, true));
            now += step;
        }
        events.extend(t.update(at + held_ms, false));
        events
    }

    #[test]
    fn stopped_timer_does_not_accumulate() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, false);
        t.update(5_000, false);
        assert_eq!(t.elapsed_ms(), 0);
    }

    #[test]
    fn short_press_toggles_and_time_accumulates_only_while_running() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, false);
        assert_eq!(press(&mut t, 100, 300, 10), vec![TimerEvent::Started]);
        assert!(t.is_running());

        t.update(1_400, false);
        assert_eq!(t.elapsed_ms(), 1_000);

        assert_eq!(press(&mut t, 1_500, 200, 10), vec![TimerEvent::Stopped]);
        let frozen = t.elapsed_ms();
        t.update(9_000, false);
        assert_eq!(t.elapsed_ms(), frozen);
    }

    #[test]
    fn long_press_resets_once_and_release_does_not_toggle() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, false);
        press(&mut t, 10, 100, 10);
        t.update(5_000, false);
        assert!(t.elapsed_ms() > 0);

        let events = press(&mut t, 6_000, 4_000, 10);
        assert_eq!(events, vec![TimerEvent::Reset]);
        assert!(!t.is_running());
        assert_eq!(t.elapsed_ms(), 0);
        assert_eq!(t.state().press_started_at, None);
        assert!(!t.state().long_press_handled);
    }

    #[test]
    fn long_press_while_stopped_stays_stopped_at_zero() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, false);
        let events = press(&mut t, 100, 1_600, 10);
        assert_eq!(events, vec![TimerEvent::Reset]);
        assert!(!t.is_running());
        assert_eq!(t.elapsed_ms(), 0);
    }

    #[test]
    fn release_past_threshold_without_intermediate_poll_is_ignored() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, true);
        assert_eq!(t.update(1_501, false), None);
        assert!(!t.is_running());
    }

    #[test]
    fn release_exactly_at_threshold_still_toggles() {
        let mut t = BrewTimer::new(1500, 0);
        t.update(0, true);
        assert_eq!(t.update(1_500, true), None);
        assert_eq!(t.update(1_500, false), Some(TimerEvent::Started));
    }

    #[test]
    fn debounced_press_keeps_held_duration() {
        let mut t = BrewTimer::new(1500, 20);
        t.update(0, false);
        // bounce, then a clean 300 ms press
        t.update(5, true);
        t.update(8, false);
        let events = press(&mut t, 100, 300, 10);
        assert!(events.is_empty(), "release not yet debounced: {events:?}");
        for now in (410..=440).step_by(10) {
            if let Some(ev) = t.update(now, false) {
                assert_eq!(ev, TimerEvent::Started);
            }
        }
        assert!(t.is_running());
    }
}
