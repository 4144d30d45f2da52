use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
// Fixed 365-day year, no leap adjustment.
const YEAR: u64 = 365 * DAY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid duration, use 15m, 2h, 3d, 1w or 1y")]
pub struct DurationError(pub String);

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,6})([mhdwy])$").unwrap())
}

/// Parses `15m` / `2h` / `3d` / `1w` / `1y` into seconds.
///
/// `Ok(None)` means no duration was given (forever), an `Err` means the token
/// was present but malformed.
pub fn parse_duration(token: Option<&str>) -> Result<Option<u64>, DurationError> {
    let Some(raw) = token else {
        return Ok(None);
    };
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        return Ok(None);
    }

    let captures = duration_pattern()
        .captures(&token)
        .ok_or_else(|| DurationError(raw.to_string()))?;
    let count: u64 = captures[1]
        .parse()
        .map_err(|_| DurationError(raw.to_string()))?;
    let unit = match &captures[2] {
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => WEEK,
        _ => YEAR,
    };

    Ok(Some(count * unit))
}

/// True when the token is meant as a duration (starts with a digit), even if
/// it turns out to be malformed.
pub fn looks_like_duration(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Helper function to format time duration in a human-readable way
pub fn format_time_duration(seconds: u64) -> String {
    let hours = seconds / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;

    if hours == 0 {
        let minutes = minutes.max(1);
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = hours / 24;
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration(Some("15m")), Ok(Some(15 * 60)));
        assert_eq!(parse_duration(Some("2h")), Ok(Some(7200)));
        assert_eq!(parse_duration(Some("3d")), Ok(Some(259_200)));
        assert_eq!(parse_duration(Some("1w")), Ok(Some(604_800)));
        assert_eq!(parse_duration(Some("1y")), Ok(Some(31_536_000)));
    }

    #[test]
    fn test_parse_duration_is_case_insensitive() {
        assert_eq!(parse_duration(Some("2H")), Ok(Some(7200)));
        assert_eq!(parse_duration(Some(" 1D ")), Ok(Some(86_400)));
    }

    #[test]
    fn test_absent_duration_means_forever() {
        assert_eq!(parse_duration(None), Ok(None));
        assert_eq!(parse_duration(Some("")), Ok(None));
        assert_eq!(parse_duration(Some("   ")), Ok(None));
    }

    #[test]
    fn test_malformed_duration_is_an_error() {
        for bad in ["15", "15x", "m15", "-1d", "1234567m", "1.5h", "1 h"] {
            assert_eq!(
                parse_duration(Some(bad)),
                Err(DurationError(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_max_count_is_six_digits() {
        assert_eq!(parse_duration(Some("999999y")), Ok(Some(999_999 * YEAR)));
    }

    #[test]
    fn test_looks_like_duration() {
        assert!(looks_like_duration("15m"));
        assert!(looks_like_duration("15x"));
        assert!(!looks_like_duration("spam"));
        assert!(!looks_like_duration(""));
    }

    #[test]
    fn test_format_time_duration() {
        assert_eq!(format_time_duration(59), "1 minute");
        assert_eq!(format_time_duration(600), "10 minutes");
        assert_eq!(format_time_duration(3600), "1 hour");
        assert_eq!(format_time_duration(82_800), "23 hours");
        assert_eq!(format_time_duration(3 * DAY), "3 days");
    }
}
