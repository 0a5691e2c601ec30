//! Input validation for durations and interval bounds.
//!
//! The timer engine assumes every duration it receives is already valid.
//! Callers run user input through these checks first.

use crate::error::FocusError;

/// Smallest accepted work length, in minutes.
pub const MIN_WORK_MINUTES: u32 = 1;

/// Smallest accepted rest length, in minutes.
pub const MIN_REST_MINUTES: u32 = 1;

/// Longest accepted work or rest length, in minutes.
pub const MAX_MINUTES: u32 = 24 * 60;

/// Accepted rest-percent range for the percent-of-work rest rule.
pub const REST_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 5..=20;

/// Parse a positive whole number of minutes typed by the user.
///
/// # Errors
///
/// Returns `FocusError::Validation` if the text is not a whole number
/// between `floor` and `MAX_MINUTES`.
pub fn parse_minutes(text: &str, label: &str, floor: u32) -> Result<u32, FocusError> {
    let value: u32 = text.trim().parse().map_err(|_| {
        FocusError::Validation(format!("{label} must be a whole number of minutes, got '{text}'"))
    })?;
    check_minutes(value, label, floor)
}

/// Check a minute count against `floor` and `MAX_MINUTES`.
///
/// # Errors
///
/// Returns `FocusError::Validation` when out of range.
pub fn check_minutes(value: u32, label: &str, floor: u32) -> Result<u32, FocusError> {
    if value < floor {
        return Err(FocusError::Validation(format!(
            "{label} must be at least {floor} minute{}",
            if floor == 1 { "" } else { "s" }
        )));
    }
    if value > MAX_MINUTES {
        return Err(FocusError::Validation(format!(
            "{label} must be at most {MAX_MINUTES} minutes"
        )));
    }
    Ok(value)
}

/// Check that `min <= max`.
///
/// # Errors
///
/// Returns `FocusError::Validation` when the bounds are out of order.
pub fn check_order(min: u32, max: u32, label: &str) -> Result<(), FocusError> {
    if min > max {
        return Err(FocusError::Validation(format!(
            "{label} minimum ({min}) must not exceed maximum ({max})"
        )));
    }
    Ok(())
}

/// Check a rest percentage.
///
/// # Errors
///
/// Returns `FocusError::Validation` outside `REST_PERCENT_RANGE`.
pub fn check_rest_percent(percent: u32) -> Result<u32, FocusError> {
    if REST_PERCENT_RANGE.contains(&percent) {
        Ok(percent)
    } else {
        Err(FocusError::Validation(format!(
            "rest percent must be between {} and {}, got {percent}",
            REST_PERCENT_RANGE.start(),
            REST_PERCENT_RANGE.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("25", "work", MIN_WORK_MINUTES).unwrap(), 25);
        assert_eq!(parse_minutes(" 5 ", "rest", MIN_REST_MINUTES).unwrap(), 5);
    }

    #[test]
    fn test_parse_minutes_rejects_garbage_and_non_positive() {
        assert!(parse_minutes("abc", "work", 1).unwrap_err().is_validation());
        assert!(parse_minutes("-3", "work", 1).is_err());
        assert!(parse_minutes("0", "work", 1).is_err());
        assert!(parse_minutes("2.5", "work", 1).is_err());
    }

    #[test]
    fn test_check_minutes_bounds() {
        assert!(check_minutes(7, "rest-min", 8).is_err());
        assert!(check_minutes(8, "rest-min", 8).is_ok());
        assert!(check_minutes(MAX_MINUTES + 1, "work", 1).is_err());
    }

    #[test]
    fn test_check_order() {
        assert!(check_order(20, 45, "work").is_ok());
        assert!(check_order(10, 10, "rest").is_ok());
        let err = check_order(45, 20, "work").unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_check_rest_percent() {
        assert!(check_rest_percent(4).is_err());
        assert_eq!(check_rest_percent(5).unwrap(), 5);
        assert_eq!(check_rest_percent(20).unwrap(), 20);
        assert!(check_rest_percent(21).is_err());
    }
}
