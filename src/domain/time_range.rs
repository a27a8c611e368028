// Relative time-range tokens ("2h", "30m", "6M") for the render backend
use crate::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

// Lowercase m is minutes, uppercase M is months.
static RELATIVE_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[mhdyM]$").expect("relative offset pattern is valid"));

/// Turn a user token into the backend's `from` value, e.g. `2h` -> `now-2h`.
pub fn parse_relative_offset(token: &str) -> AppResult<String> {
    if RELATIVE_OFFSET.is_match(token) {
        Ok(format!("now-{}", token))
    } else {
        Err(AppError::InvalidTimeRange(token.to_string()))
    }
}
