//! Duration formatting and input parsing

use serde_json::Value;

use crate::error::TimerError;

/// Shortest countdown that can be started
pub const MIN_SECONDS: i64 = 1;
/// Longest countdown that can be started (one hour)
pub const MAX_SECONDS: i64 = 3600;

/// Text shown once a countdown has run out
pub const DONE_TEXT: &str = "Done!";

const NOT_A_NUMBER: &str = "Please enter a valid number of seconds (greater than 0)";
const TOO_LARGE: &str = "Maximum time limit is 3600 seconds (1 hour)";

/// Format a number of seconds for display.
///
/// `HH:MM:SS` from one hour up, `MM:SS` from one minute up, and two-digit
/// bare seconds below that. Zero or less renders as [`DONE_TEXT`].
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return DONE_TEXT.to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{:02}:{:02}", minutes, secs)
    } else {
        format!("{:02}", secs)
    }
}

/// Check that a requested duration lies within the accepted range
pub fn validate_seconds(requested: i64) -> Result<u32, TimerError> {
    if requested < MIN_SECONDS {
        return Err(TimerError::invalid_input(requested, NOT_A_NUMBER));
    }
    if requested > MAX_SECONDS {
        return Err(TimerError::invalid_input(requested, TOO_LARGE));
    }
    // Range checked above, the cast cannot truncate.
    Ok(requested as u32)
}

/// Parse a duration typed by a user. Surrounding whitespace is ignored,
/// anything else that is not a whole decimal number is rejected.
pub fn parse_seconds(raw: &str) -> Result<i64, TimerError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TimerError::invalid_input(raw, NOT_A_NUMBER))
}

/// Extract a duration from a JSON request field.
///
/// Integers and numeric strings are accepted. Fractional numbers, booleans,
/// null and everything else is invalid input.
pub fn seconds_from_json(value: &Value) -> Result<i64, TimerError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| TimerError::invalid_input(n, NOT_A_NUMBER)),
        Value::String(s) => parse_seconds(s),
        other => Err(TimerError::invalid_input(other, NOT_A_NUMBER)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_done_for_zero_and_negative() {
        assert_eq!(format_duration(0), "Done!");
        assert_eq!(format_duration(-12), "Done!");
    }

    #[test]
    fn formats_bare_seconds_padded() {
        assert_eq!(format_duration(59), "59");
        assert_eq!(format_duration(5), "05");
        assert_eq!(format_duration(1), "01");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(60), "01:00");
        assert_eq!(format_duration(754), "12:34");
        assert_eq!(format_duration(3599), "59:59");
    }

    #[test]
    fn formats_hours() {
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_duration(3661), "01:01:01");
    }

    #[test]
    fn validates_range() {
        assert_eq!(validate_seconds(1), Ok(1));
        assert_eq!(validate_seconds(3600), Ok(3600));
        assert!(matches!(validate_seconds(0), Err(TimerError::InvalidInput { .. })));
        assert!(matches!(validate_seconds(-3), Err(TimerError::InvalidInput { .. })));
        let err = validate_seconds(3601).unwrap_err();
        assert_eq!(err.to_string(), "Maximum time limit is 3600 seconds (1 hour)");
    }

    #[test]
    fn parses_user_text() {
        assert_eq!(parse_seconds(" 42 "), Ok(42));
        assert_eq!(parse_seconds("-7"), Ok(-7));
        assert!(parse_seconds("").is_err());
        assert!(parse_seconds("abc").is_err());
        assert!(parse_seconds("1.5").is_err());
        assert!(parse_seconds("12abc").is_err());
    }

    #[test]
    fn reads_json_field() {
        assert_eq!(seconds_from_json(&json!(30)), Ok(30));
        assert_eq!(seconds_from_json(&json!("30")), Ok(30));
        assert!(seconds_from_json(&json!(2.5)).is_err());
        assert!(seconds_from_json(&json!(null)).is_err());
        assert!(seconds_from_json(&json!(true)).is_err());
        assert!(seconds_from_json(&json!([5])).is_err());
    }
}
