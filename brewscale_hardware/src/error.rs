use thiserror::Error;

/// Failures raised by the amplifier driver and the GPIO adapters.
#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio unavailable: {0}")]
    Gpio(String),
    #[error("cannot open {role} on pin {pin}: {reason}")]
    Pin {
        role: &'static str,
        pin: u8,
        reason: String,
    },
    /// DOUT stayed high for the whole ready window.
    #[error("hx711 data-ready timeout after {0:?}")]
    DataReadyTimeout(std::time::Duration),
    #[error("invalid hx711 gain {0} (expected 128, 64 or 32)")]
    InvalidGain(u16),
}

pub type Result<T> = std::result::Result<T, HwError>;
