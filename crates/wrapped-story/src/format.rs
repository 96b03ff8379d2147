//! Human-readable formatting for story text.

use chrono::{DateTime, Utc};

use wrapped_analytics::Bucketing;

/// Long US-style date, e.g. "March 5, 2024", on the same wall clock the
/// activity buckets use.
///
/// Epoch-zero and earlier instants are artifacts of missing data and render
/// as "an unknown date".
pub fn format_date(date: DateTime<Utc>, bucketing: &Bucketing) -> String {
    if date.timestamp_millis() <= 0 {
        return "an unknown date".to_string();
    }
    bucketing.localize(date).format("%B %-d, %Y").to_string()
}

/// 12-hour clock label for an hour of day, e.g. "1 PM".
pub fn format_hour(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{hour} AM"),
        12 => "12 PM".to_string(),
        13..=23 => format!("{} PM", hour - 12),
        _ => "an unknown time".to_string(),
    }
}

/// Integer with thousands separators, e.g. "12,345".
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shortest decimal form: "20" for 20.0, "15.5" for 15.5.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(date, &Bucketing::utc()), "March 5, 2024");
        assert_eq!(
            format_date(DateTime::UNIX_EPOCH, &Bucketing::utc()),
            "an unknown date"
        );
    }

    #[test]
    fn test_format_date_follows_bucketing_zone() {
        // 02:00 UTC on March 5 is still March 4 at UTC-5.
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 2, 0, 0).unwrap();
        let east_coast = Bucketing::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(format_date(date, &east_coast), "March 4, 2024");
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "12 AM");
        assert_eq!(format_hour(9), "9 AM");
        assert_eq!(format_hour(12), "12 PM");
        assert_eq!(format_hour(13), "1 PM");
        assert_eq!(format_hour(24), "an unknown time");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(20.0), "20");
        assert_eq!(format_decimal(15.5), "15.5");
    }
}
