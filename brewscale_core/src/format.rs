//! Text handed to the render sink.

/// Weights closer to zero than this render as `0.0g`.
pub const ZERO_BAND_G: f32 = 0.2;

/// `m:ss`, minutes unbounded.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let secs = elapsed_ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One decimal place with an explicit sign and a dead zone around zero.
pub fn format_weight(grams: f32) -> String {
    if grams <= -ZERO_BAND_G {
        format!("-{:.1}g", grams.abs())
    } else if grams < ZERO_BAND_G {
        "0.0g".to_string()
    } else {
        format!("{grams:.1}g")
    }
}
