//! Shared utilities for CLI commands.

use chrono::{DateTime, Duration, FixedOffset, Local};

/// The current local time at second precision.
pub fn local_now() -> DateTime<FixedOffset> {
    wl_core::time::truncate_to_seconds(Local::now()).fixed_offset()
}

/// Formats a duration as `HH:MM:SS`.
///
/// Hours are not wrapped at 24. Negative durations are shown as `00:00:00`.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let (hours, rest) = (secs / 3600, secs % 3600);
    format!("{hours:02}:{:02}:{:02}", rest / 60, rest % 60)
}

/// Formats a duration as `HH:MM`, dropping the seconds.
pub fn format_hm(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        let d = Duration::hours(1) + Duration::minutes(5) + Duration::seconds(30);
        assert_eq!(format_hms(d), "01:05:30");
    }

    #[test]
    fn test_format_hms_beyond_a_day() {
        assert_eq!(format_hms(Duration::hours(26)), "26:00:00");
    }

    #[test]
    fn test_format_hms_negative_is_zero() {
        assert_eq!(format_hms(Duration::minutes(-5)), "00:00:00");
    }

    #[test]
    fn test_format_hm_drops_seconds() {
        assert_eq!(format_hm(Duration::seconds(3 * 3600 + 59 * 60 + 59)), "03:59");
    }

    #[test]
    fn test_local_now_has_no_subseconds() {
        assert_eq!(local_now().timestamp_subsec_nanos(), 0);
    }
}
