use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaleError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    SensorTimeout,
    #[error("invalid amplifier gain {0}")]
    InvalidGain(u16),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("render error: {0}")]
    Render(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing scale")]
    MissingScale,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// True when any error in the report's chain is a sensor timeout.
pub fn is_sensor_timeout(err: &Report) -> bool {
    err.chain()
        .any(|e| matches!(e.downcast_ref::<ScaleError>(), Some(ScaleError::SensorTimeout)))
}
