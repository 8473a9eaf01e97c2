//! Digital line abstractions used by the bit-banged amplifier driver and the
//! front-panel buttons.

/// A digital input sampled by the driver (e.g. the HX711 DOUT line).
pub trait InputLine {
    fn is_high(&self) -> bool;

    #[inline]
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// A digital output driven by the driver (e.g. the HX711 PD_SCK line).
pub trait OutputLine {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// A momentary push button.
///
/// Implementations fold electrical polarity in: the front-panel buttons are
/// active-low with pull-ups, so `is_pressed()` is true while the line reads low.
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

impl<F> Button for F
where
    F: FnMut() -> bool,
{
    fn is_pressed(&mut self) -> bool {
        self()
    }
}
