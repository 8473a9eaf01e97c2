pub mod error;
pub mod hx711;
pub mod sim;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

pub use error::HwError;
pub use hx711::{Gain, Hx711};
pub use sim::{SimulatedButton, SimulatedLoadCell};
