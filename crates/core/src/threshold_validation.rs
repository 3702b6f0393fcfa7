//! Parsing and range checks for user-supplied threshold values.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Threshold lists are comma separated; whitespace around commas is ignored.
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("valid regex"));

/// Parse a `"a,b,c"` threshold list into exactly three finite numbers.
///
/// Returns a `CoreError::Validation` naming the option on any malformed
/// entry or wrong arity.
pub fn parse_threshold_list(raw: &str, name: &str) -> Result<[f64; 3], CoreError> {
    let parts: Vec<&str> = LIST_SEPARATOR.split(raw.trim()).collect();
    if parts.len() != 3 {
        return Err(CoreError::Validation(format!(
            "{name} must contain exactly 3 comma-separated values, got '{raw}'"
        )));
    }

    let mut values = [0.0; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = parse_threshold_value(part, name)?;
    }
    Ok(values)
}

/// Parse one threshold number, rejecting NaN and infinities.
pub fn parse_threshold_value(raw: &str, name: &str) -> Result<f64, CoreError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        CoreError::Validation(format!("{name} contains an invalid number: '{raw}'"))
    })?;
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got '{raw}'"
        )));
    }
    Ok(value)
}

/// Validate that a memory percentage falls within `[0, 100]`.
pub fn validate_percentage(value: u32, name: &str) -> Result<(), CoreError> {
    if value > 100 {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}
