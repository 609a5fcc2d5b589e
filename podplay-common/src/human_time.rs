//! Human-readable time formatting
//!
//! Matches the clock style shown under progress bars: `M:SS` below one hour,
//! `H:MM:SS` from one hour up.

const SECONDS_PER_HOUR: u64 = 3600;

/// Format a position or duration in seconds as a clock string.
///
/// Fractions are truncated. Negative and non-finite input renders as `0:00`.
///
/// # Examples
///
/// ```
/// use podplay_common::human_time::format_duration;
///
/// assert_eq!(format_duration(0.0), "0:00");
/// assert_eq!(format_duration(75.9), "1:15");
/// assert_eq!(format_duration(3725.0), "1:02:05");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / SECONDS_PER_HOUR;
    let mins = (total % SECONDS_PER_HOUR) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_format() {
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(59.99), "0:59");
        assert_eq!(format_duration(600.0), "10:00");
        assert_eq!(format_duration(3599.0), "59:59");
    }

    #[test]
    fn test_hours_format() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(36_000.0 + 61.0), "10:01:01");
    }

    #[test]
    fn test_invalid_input_renders_zero() {
        assert_eq!(format_duration(-4.0), "0:00");
        assert_eq!(format_duration(f64::NAN), "0:00");
        assert_eq!(format_duration(f64::INFINITY), "0:00");
    }
}
