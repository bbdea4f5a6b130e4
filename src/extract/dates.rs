// src/extract/dates.rs
//! Lenient publish-date parsing. Feeds hand us anything from RFC 2822
//! pubDates to bare "July 15, 2025" bylines; an unparseable string yields
//! `None` and the caller carries on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%Y",
];

/// Parse a raw publish-date string into a UTC instant. Timezone-less inputs
/// are treated as already being UTC.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for f in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(ndt.and_utc());
        }
    }
    for f in NAIVE_DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(s, f) {
            return Some(nd.and_time(NaiveTime::MIN).and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn rfc2822_pub_dates_parse() {
        let dt = parse_publish_date("Tue, 12 Aug 2025 14:30:00 GMT").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-08-12T14:30:00+00:00");
    }

    #[test]
    fn rfc3339_with_offset_normalizes_to_utc() {
        let dt = parse_publish_date("2025-08-12T16:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn bare_dates_and_bylines_parse_at_midnight_utc() {
        for raw in ["2025-07-15", "July 15, 2025", "Jul 15, 2025", "15 July 2025", "07/15/2025"] {
            let dt = parse_publish_date(raw).unwrap_or_else(|| panic!("failed on {raw}"));
            assert_eq!(dt.to_rfc3339(), "2025-07-15T00:00:00+00:00", "input {raw}");
        }
    }

    #[test]
    fn naive_datetimes_are_taken_as_utc() {
        let dt = parse_publish_date("2025-08-12 10:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-08-12T10:00:00+00:00");
    }

    #[test]
    fn garbage_and_empty_yield_none() {
        assert!(parse_publish_date("").is_none());
        assert!(parse_publish_date("   ").is_none());
        assert!(parse_publish_date("yesterday-ish").is_none());
        assert!(parse_publish_date("2025-13-40").is_none());
    }
}
