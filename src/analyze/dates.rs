// src/analyze/dates.rs
//! Lenient feed date parsing: RFC 2822 first, then ISO 8601.
//! Parse failures are "no date", never errors.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

const ISO_WITH_OFFSET: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const ISO_NAIVE: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a raw feed date. Timestamps without an offset are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    parse_iso8601(&s.replace('Z', "+00:00"))
}

fn parse_iso8601(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Some(dt) = ISO_WITH_OFFSET
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Some(naive) = ISO_NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(as_utc(naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(as_utc)
}

fn as_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

/// Whole days elapsed from `then` to `now`, floored (future dates are negative).
pub fn elapsed_days(now: DateTime<Utc>, then: DateTime<FixedOffset>) -> i64 {
    let delta = now.signed_duration_since(then.with_timezone(&Utc));
    let days = delta.num_days();
    // num_days truncates toward zero
    if delta < Duration::zero() && delta != Duration::days(days) {
        days - 1
    } else {
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_is_none() {
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
    }

    #[test]
    fn rfc2822_variants() {
        let a = parse_date("Wed, 01 May 2024 12:00:00 +0000").unwrap();
        assert_eq!(a, now());
        let b = parse_date("Wed, 01 May 2024 08:00:00 -0400").unwrap();
        assert_eq!(b, now());
        let c = parse_date("Wed, 01 May 2024 12:00:00 GMT").unwrap();
        assert_eq!(c, now());
    }

    #[test]
    fn iso_with_z_and_offsets() {
        assert_eq!(parse_date("2024-05-01T12:00:00Z").unwrap(), now());
        assert_eq!(parse_date("2024-05-01T20:00:00+08:00").unwrap(), now());
        assert_eq!(parse_date("2024-05-01T20:00:00.250+08:00").unwrap().nanosecond(), 250_000_000);
        assert_eq!(parse_date("2024-05-01 20:00:00+0800").unwrap(), now());
    }

    #[test]
    fn naive_iso_is_utc() {
        assert_eq!(parse_date("2024-05-01T12:00:00").unwrap(), now());
        assert_eq!(parse_date("2024-05-01 12:00").unwrap(), now());
        let midnight = parse_date("2024-05-01").unwrap();
        assert_eq!(midnight.offset().local_minus_utc(), 0);
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn garbage_is_none() {
        for s in ["yesterday", "2024/05/01", "32 May 2024", "Z", "2024-13-01"] {
            assert!(parse_date(s).is_none(), "{s} should not parse");
        }
    }

    #[test]
    fn elapsed_days_floors() {
        let n = now();
        let at = |h: i64| (n - Duration::hours(h)).fixed_offset();
        assert_eq!(elapsed_days(n, at(0)), 0);
        assert_eq!(elapsed_days(n, at(23)), 0);
        assert_eq!(elapsed_days(n, at(24)), 1);
        assert_eq!(elapsed_days(n, at(47)), 1);
        assert_eq!(elapsed_days(n, at(48)), 2);
        assert_eq!(elapsed_days(n, at(-1)), -1);
        assert_eq!(elapsed_days(n, at(-24)), -1);
        assert_eq!(elapsed_days(n, at(-25)), -2);
    }
}
