//! Human-readable renderings of durations and capture timestamps.
//!
//! Durations use the compact `1h2m3s` notation. Seconds are rounded to the
//! nearest whole second first so reports never show long fractional tails.

use chrono::{DateTime, Utc};

/// Format a number of seconds as a whole-second duration, e.g. `1m5s`.
pub fn format_seconds(secs: f64) -> String {
    if !secs.is_finite() {
        return "0s".to_string();
    }
    let rounded = secs.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let total = rounded.unsigned_abs();

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Format an elapsed wall-clock time rounded to the millisecond,
/// e.g. `850ms`, `2.5s`, `1m3.204s`.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let millis = elapsed.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis < 1000 {
        return format!("{millis}ms");
    }

    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    let frac = millis % 1000;

    let mut seconds = secs.to_string();
    if frac > 0 {
        let digits = format!("{frac:03}");
        seconds.push('.');
        seconds.push_str(digits.trim_end_matches('0'));
    }

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// RFC 1123 rendering used in report headers: `Mon, 02 Jan 2006 15:04:05 UTC`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn seconds_only() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(45.0), "45s");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_seconds(65.0), "1m5s");
        assert_eq!(format_seconds(60.0), "1m0s");
    }

    #[test]
    fn hours_keep_zero_minutes() {
        assert_eq!(format_seconds(3605.0), "1h0m5s");
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(format_seconds(64.4), "1m4s");
        assert_eq!(format_seconds(64.5), "1m5s");
        assert_eq!(format_seconds(29.99999), "30s");
    }

    #[test]
    fn negative_values_are_signed() {
        assert_eq!(format_seconds(-5.2), "-5s");
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(format_seconds(f64::NAN), "0s");
    }

    #[test]
    fn elapsed_rendering() {
        assert_eq!(format_elapsed(Duration::from_micros(400)), "0s");
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_millis(63_204)), "1m3.204s");
        assert_eq!(format_elapsed(Duration::from_secs(7200)), "2h0m0s");
    }

    #[test]
    fn rfc1123_timestamp() {
        let at = Utc.with_ymd_and_hms(2022, 6, 3, 14, 5, 9).unwrap();
        assert_eq!(format_timestamp(&at), "Fri, 03 Jun 2022 14:05:09 UTC");
    }
}
