//! Human-readable error descriptions and structured JSON error formatting.

use brewscale_core::error::{BuildError, ScaleError, is_sensor_timeout};

/// Exit code for a sensor that stopped answering.
pub const EXIT_TIMEOUT: i32 = 3;
/// Exit code for configuration problems (same as clap's usage errors).
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_OTHER: i32 = 1;

const TIMEOUT_TEXT: &str = "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify the DT/SCK pins and power, and consider increasing hx711.read_timeout_ms in the config.";

fn find_scale_error(err: &eyre::Report) -> Option<&ScaleError> {
    err.chain().find_map(|e| e.downcast_ref::<ScaleError>())
}

fn find_build_error(err: &eyre::Report) -> Option<&BuildError> {
    err.chain().find_map(|e| e.downcast_ref::<BuildError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = find_build_error(err) {
        return match be {
            BuildError::MissingScale => {
                "What happened: No amplifier was provided to the scale controller.\nLikely causes: The HX711 failed to initialize or was not wired into the builder.\nHow to fix: Ensure the amplifier opens successfully and is passed via with_scale(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if is_sensor_timeout(err) {
        return TIMEOUT_TEXT.to_string();
    }

    if let Some(se) = find_scale_error(err) {
        return match se {
            ScaleError::InvalidGain(g) => format!(
                "What happened: Unsupported amplifier gain {g}.\nLikely causes: hx711.gain is set to something other than 128, 64 or 32.\nHow to fix: Use 128 or 64 (channel A) or 32 (channel B)."
            ),
            ScaleError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: A typo or an out-of-range value in the TOML.\nHow to fix: Edit the config file and try again."
            ),
            ScaleError::Render(msg) => format!(
                "What happened: The display could not be updated ({msg}).\nLikely causes: The output was closed or the display is disconnected.\nHow to fix: Check the display connection, then restart."
            ),
            ScaleError::Hardware(msg) | ScaleError::HardwareFault(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: Wrong pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process can access GPIO."
            ),
            ScaleError::SensorTimeout => TIMEOUT_TEXT.to_string(),
        };
    }

    // Generic fallback
    let msg = format!("{err:#}");
    format!(
        "Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
    )
}

/// Stable exit codes: sensor timeout 3, configuration 2, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if is_sensor_timeout(err) {
        return EXIT_TIMEOUT;
    }
    if matches!(find_build_error(err), Some(BuildError::InvalidConfig(_)))
        || matches!(
            find_scale_error(err),
            Some(ScaleError::Config(_) | ScaleError::InvalidGain(_))
        )
    {
        return EXIT_CONFIG;
    }
    EXIT_OTHER
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if is_sensor_timeout(err) {
        return "SensorTimeout";
    }
    if let Some(be) = find_build_error(err) {
        return match be {
            BuildError::MissingScale => "MissingScale",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    match find_scale_error(err) {
        Some(ScaleError::InvalidGain(_)) => "InvalidGain",
        Some(ScaleError::Config(_)) => "Config",
        Some(ScaleError::Render(_)) => "Render",
        Some(ScaleError::Hardware(_) | ScaleError::HardwareFault(_)) => "Hardware",
        Some(ScaleError::SensorTimeout) => "SensorTimeout",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn timeout_is_recognized_through_context() {
        let err: eyre::Result<()> = Err(eyre::Report::new(ScaleError::SensorTimeout));
        let err = err.wrap_err("startup tare").unwrap_err();
        assert_eq!(exit_code_for_error(&err), EXIT_TIMEOUT);
        assert!(humanize(&err).starts_with("What happened: Scale read timed out"));
    }

    #[test]
    fn config_errors_exit_with_two() {
        let err = eyre::Report::new(ScaleError::InvalidGain(100));
        assert_eq!(exit_code_for_error(&err), EXIT_CONFIG);
        let err = eyre::Report::new(BuildError::InvalidConfig("filter window must be >= 4"));
        assert_eq!(exit_code_for_error(&err), EXIT_CONFIG);
        assert!(humanize(&err).contains("filter window"));
    }

    #[test]
    fn unknown_errors_fall_back_to_generic_text() {
        let err = eyre::eyre!("disk on fire");
        assert_eq!(exit_code_for_error(&err), EXIT_OTHER);
        assert!(humanize(&err).contains("disk on fire"));
    }

    #[test]
    fn json_error_carries_reason_and_code() {
        let err = eyre::Report::new(ScaleError::Config("hx711.gain must be 128".into()));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 2);
        assert!(v["message"].as_str().unwrap().contains("hx711.gain"));
    }
}
