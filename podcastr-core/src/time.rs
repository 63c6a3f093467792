//! Time and duration conversion utilities.
//!
//! Episode lengths and playback positions are displayed as `HH:MM:SS`. The
//! media capability reports fractional seconds, which are floored before they
//! reach the progress display.

use std::time::Duration;

const HOUR_IN_SECONDS: u64 = 3600;
const MINUTE_IN_SECONDS: u64 = 60;

/// Format a number of seconds as `HH:MM:SS`.
///
/// Each unit is zero-padded to two digits. Hours are not wrapped, so durations
/// of 100 hours or more produce a wider hour field.
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / HOUR_IN_SECONDS;
    let minutes = (total_secs % HOUR_IN_SECONDS) / MINUTE_IN_SECONDS;
    let seconds = total_secs % MINUTE_IN_SECONDS;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parse an `HH:MM:SS` (or `MM:SS`, or plain seconds) string back into seconds.
///
/// Minutes and seconds must be below 60 when a larger unit is present.
#[must_use]
pub fn parse_time_string(input: &str) -> Option<u64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let numbers = parts
        .iter()
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                part.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<u64>>>()?;

    match numbers.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] if *seconds < 60 => Some(minutes * MINUTE_IN_SECONDS + seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            Some(hours * HOUR_IN_SECONDS + minutes * MINUTE_IN_SECONDS + seconds)
        }
        _ => None,
    }
}

/// Floor a fractional media position to whole seconds.
///
/// Negative and NaN positions collapse to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_seconds(position_secs: f64) -> u64 {
    if position_secs.is_nan() || position_secs <= 0.0 {
        return 0;
    }

    // Float-to-int `as` saturates at u64::MAX
    position_secs.floor() as u64
}

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;

    /// Render the whole seconds of this duration as `HH:MM:SS`.
    fn to_time_string(&self) -> String;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn to_time_string(&self) -> String {
        format_duration(self.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_duration(0), "00:00:00");
    }

    #[test]
    fn test_format_minutes_and_seconds() {
        assert_eq!(format_duration(65), "00:01:05");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_duration(3661), "01:01:01");
    }

    #[test]
    fn test_format_does_not_wrap_hours() {
        assert_eq!(format_duration(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_parse_accepts_shorter_forms() {
        assert_eq!(parse_time_string("01:01:01"), Some(3661));
        assert_eq!(parse_time_string("1:05"), Some(65));
        assert_eq!(parse_time_string(" 90 "), Some(90));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_time_string(""), None);
        assert_eq!(parse_time_string("00:61:00"), None);
        assert_eq!(parse_time_string("-1"), None);
        assert_eq!(parse_time_string("1:2:3:4"), None);
        assert_eq!(parse_time_string("ab:cd"), None);
    }

    #[test]
    fn test_whole_seconds_floors() {
        assert_eq!(whole_seconds(12.99), 12);
        assert_eq!(whole_seconds(0.4), 0);
        assert_eq!(whole_seconds(-3.0), 0);
        assert_eq!(whole_seconds(f64::NAN), 0);
    }

    #[test]
    fn test_to_time_string_ignores_subsecond_part() {
        assert_eq!(Duration::from_millis(65_900).to_time_string(), "00:01:05");
        assert_eq!(Duration::from_millis(1234).as_millis_u64(), 1234);
    }

    proptest! {
        #[test]
        fn format_round_trips_within_a_day(d in 0u64..86_400) {
            let formatted = format_duration(d);
            let bytes = formatted.as_bytes();

            prop_assert_eq!(bytes.len(), 8);
            prop_assert_eq!(bytes[2], b':');
            prop_assert_eq!(bytes[5], b':');
            prop_assert!(bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit()));
            prop_assert_eq!(parse_time_string(&formatted), Some(d));
        }
    }
}
