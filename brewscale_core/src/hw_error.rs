//! Maps `Box<dyn Error>` from trait boundaries to typed `ScaleError`.
//!
//! The traits in `brewscale_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `brewscale_hardware::HwError` downcasting.

use crate::error::ScaleError;

/// Map a trait-boundary error to a typed `ScaleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ScaleError {
    #[cfg(feature = "hardware-errors")]
    {
        use brewscale_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::DataReadyTimeout(_) => ScaleError::SensorTimeout,
                HwError::InvalidGain(g) => ScaleError::InvalidGain(*g),
                other => ScaleError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(se) = e.downcast_ref::<ScaleError>() {
        return se.clone();
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ScaleError::SensorTimeout
    } else {
        ScaleError::Hardware(s)
    }
}
