//! Time codec: clock strings in, seconds out, and back to display strings.
//!
//! Chip times arrive as `H:MM:SS` or `MM:SS`. Everything downstream works in
//! whole or fractional seconds; formatting only happens at the edges.

use thiserror::Error;

/// Why a clock string could not be turned into seconds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty time string")]
    Empty,

    #[error("time '{0}' has no ':' separator")]
    MissingColon(String),

    #[error("time has {0} ':'-separated parts, expected 2 or 3")]
    WrongPartCount(usize),

    #[error("invalid number in time '{0}'")]
    InvalidNumber(String),

    #[error("time '{0}' is zero")]
    Zero(String),
}

/// Parse `H:MM:SS` or `MM:SS` into whole seconds.
///
/// Anything without a colon or with the wrong number of parts is rejected.
/// A zero duration is rejected as well: no finisher has a zero chip time.
pub fn parse_clock(s: &str) -> Result<u32, TimeParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeParseError::Empty);
    }
    if !s.contains(':') {
        return Err(TimeParseError::MissingColon(s.to_string()));
    }

    let parts: Vec<&str> = s.split(':').collect();
    let nums = parts
        .iter()
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|_| TimeParseError::InvalidNumber(s.to_string()))?;

    let total = match nums.as_slice() {
        [h, m, sec] => h
            .checked_mul(3600)
            .and_then(|v| v.checked_add(m.checked_mul(60)?))
            .and_then(|v| v.checked_add(*sec)),
        [m, sec] => m.checked_mul(60).and_then(|v| v.checked_add(*sec)),
        other => return Err(TimeParseError::WrongPartCount(other.len())),
    }
    .ok_or_else(|| TimeParseError::InvalidNumber(s.to_string()))?;

    if total == 0 {
        return Err(TimeParseError::Zero(s.to_string()));
    }
    Ok(total)
}

/// Human duration: `"3h 25m"`, or `"58m"` when under an hour.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Zero-padded clock: `"3:05:09"`.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h}:{m:02}:{s:02}")
}

/// Axis tick label: `"3:05"` (hours and minutes only).
pub fn format_tick(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 3600, (total % 3600) / 60)
}

/// Pace per mile: `"8:15 min/mi"`.
///
/// Rounds to whole seconds before splitting so 479.6 s prints as `8:00`.
pub fn format_pace(seconds_per_mile: f64) -> String {
    let total = seconds_per_mile.max(0.0).round() as u64;
    format!("{}:{:02} min/mi", total / 60, total % 60)
}

/// Convert a user pace entry into decimal minutes per mile.
///
/// Accepts `"8:15"` (minutes:seconds) or a decimal such as `"8.25"`.
pub fn parse_pace_input(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some((m, sec)) = s.split_once(':') {
        let m: u32 = m.trim().parse().ok()?;
        let sec: u32 = if sec.trim().is_empty() {
            0
        } else {
            sec.trim().parse().ok()?
        };
        if sec >= 60 {
            return None;
        }
        return Some(m as f64 + sec as f64 / 60.0);
    }
    let v: f64 = s.parse().ok()?;
    v.is_finite().then_some(v)
}

/// Decimal minutes per mile back to `"m:ss"` text.
pub fn format_pace_input(minutes_per_mile: f64) -> String {
    let total = (minutes_per_mile.max(0.0) * 60.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_clock("1:05:30"), Ok(3930));
        assert_eq!(parse_clock(" 4:00:00 "), Ok(14_400));
    }

    #[test]
    fn parses_minutes_seconds() {
        assert_eq!(parse_clock("45:10"), Ok(2710));
        assert_eq!(parse_clock("75:00"), Ok(4500));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            parse_clock("abc"),
            Err(TimeParseError::MissingColon("abc".into()))
        );
        assert_eq!(parse_clock(""), Err(TimeParseError::Empty));
        assert_eq!(parse_clock("1:2:3:4"), Err(TimeParseError::WrongPartCount(4)));
        assert!(matches!(
            parse_clock("1:xx:00"),
            Err(TimeParseError::InvalidNumber(_))
        ));
        assert!(matches!(parse_clock("0:00"), Err(TimeParseError::Zero(_))));
    }

    #[test]
    fn duration_omits_zero_hours() {
        assert_eq!(format_duration(3930.0), "1h 5m");
        assert_eq!(format_duration(2710.0), "45m");
        assert_eq!(format_duration(0.0), "0m");
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(3930.0), "1:05:30");
        assert_eq!(format_clock(59.9), "0:00:59");
        assert_eq!(format_tick(3930.0), "1:05");
    }

    #[test]
    fn pace_never_prints_sixty_seconds() {
        assert_eq!(format_pace(479.6), "8:00 min/mi");
        assert_eq!(format_pace(495.0), "8:15 min/mi");
    }

    #[test]
    fn pace_input_roundtrips_through_text() {
        assert_eq!(parse_pace_input("8:15"), Some(8.25));
        assert_eq!(parse_pace_input("9.5"), Some(9.5));
        assert_eq!(parse_pace_input("8:75"), None);
        assert_eq!(parse_pace_input("fast"), None);
        assert_eq!(format_pace_input(8.25), "8:15");
        assert_eq!(format_pace_input(10.0), "10:00");
    }
}
