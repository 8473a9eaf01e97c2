//! rppal-backed GPIO lines for running on a Raspberry Pi class board.
use std::time::Duration;

use brewscale_traits::{Button, InputLine, OutputLine};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};
use crate::hx711::{Gain, Hx711};

impl InputLine for InputPin {
    #[inline]
    fn is_high(&self) -> bool {
        InputPin::is_high(self)
    }
}

impl OutputLine for OutputPin {
    #[inline]
    fn set_high(&mut self) {
        OutputPin::set_high(self);
    }

    #[inline]
    fn set_low(&mut self) {
        OutputPin::set_low(self);
    }
}

/// Active-low push button with the internal pull-up enabled.
pub struct GpioButton {
    pin: InputPin,
}

impl Button for GpioButton {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low()
    }
}

fn gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))
}

fn pin_error(role: &'static str, pin: u8, e: rppal::gpio::Error) -> HwError {
    HwError::Pin {
        role,
        pin,
        reason: e.to_string(),
    }
}

/// Open the HX711 on the given BCM pins and latch `gain` with one read.
pub fn open_hx711(
    dt_pin: u8,
    sck_pin: u8,
    gain: Gain,
    ready_timeout: Duration,
    poll_interval: Duration,
) -> Result<Hx711<InputPin, OutputPin>> {
    let gpio = gpio()?;
    let dout = gpio
        .get(dt_pin)
        .map_err(|e| pin_error("hx711 DOUT", dt_pin, e))?
        .into_input();
    let sck = gpio
        .get(sck_pin)
        .map_err(|e| pin_error("hx711 PD_SCK", sck_pin, e))?
        .into_output();
    let mut hx = Hx711::new(dout, sck, gain)
        .with_ready_timeout(ready_timeout)
        .with_poll_interval(poll_interval);
    hx.set_gain(gain)?;
    Ok(hx)
}

pub fn open_button(pin: u8) -> Result<GpioButton> {
    let pin = gpio()?
        .get(pin)
        .map_err(|e| pin_error("button", pin, e))?
        .into_input_pullup();
    Ok(GpioButton { pin })
}
