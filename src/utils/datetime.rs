//! Date/time parsing helpers for heterogeneous source timestamp formats.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a publish timestamp in the formats the sources actually emit into a
/// UTC [`DateTime`].
///
/// Supported formats (attempted in order):
/// 1. RFC 3339 / ISO 8601 with timezone: `"2024-01-15T10:30:00Z"` (Spotify, Listen Notes)
/// 2. RFC 2822: `"Mon, 15 Jan 2024 10:30:00 GMT"` (RSS `pubDate`)
/// 3. ISO 8601 without timezone, with or without sub-seconds (assumed UTC)
/// 4. `"2024-01-15 10:30:00"` (assumed UTC)
/// 5. Date only (midnight UTC): `"2024-01-15"` (Spotify `release_date`)
/// 6. Unix epoch seconds: `"1705314600"` (Podcast Index `datePublished`)
///
/// Returns `None` for empty input or unrecognised formats; the normalizer
/// degrades to the fetch time in that case.
pub fn parse_flexible_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // 1. RFC 3339.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // 2. RFC 2822 (RSS pubDate).
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // 3. ISO 8601 without timezone.
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    // 4. Space-separated datetime.
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    // 5. Date only (midnight UTC).
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    // 6. Unix epoch seconds.
    if s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(secs) = s.parse::<i64>() {
            return Utc.timestamp_opt(secs, 0).single();
        }
    }

    None
}

/// Parse an iTunes-style duration (`"HH:MM:SS"`, `"MM:SS"`, or bare seconds)
/// into whole seconds.
pub fn parse_duration_hms(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [secs] => secs.parse().ok(),
        [m, s] => {
            let minutes: u32 = m.parse().ok()?;
            let seconds: u32 = s.parse().ok()?;
            Some(minutes * 60 + seconds)
        }
        [h, m, s] => {
            let hours: u32 = h.parse().ok()?;
            let minutes: u32 = m.parse().ok()?;
            let seconds: u32 = s.parse().ok()?;
            Some(hours * 3600 + minutes * 60 + seconds)
        }
        _ => None,
    }
}

/// Format a duration in seconds as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_duration(duration_seconds: u32) -> String {
    let hours = duration_seconds / 3600;
    let minutes = (duration_seconds % 3600) / 60;
    let seconds = duration_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_utc() {
        let dt = parse_flexible_datetime("2024-01-15T10:30:00Z").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        // +05:00 offset → 10:30 local = 05:30 UTC
        let dt = parse_flexible_datetime("2024-01-15T10:30:00+05:00").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc2822_pubdate() {
        let dt = parse_flexible_datetime("Mon, 15 Jan 2024 10:30:00 GMT").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc2822_with_offset() {
        let dt = parse_flexible_datetime("Mon, 15 Jan 2024 10:30:00 -0500").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_iso_no_tz() {
        let dt = parse_flexible_datetime("2024-01-15T10:30:00").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_space_separated() {
        let dt = parse_flexible_datetime("2024-01-15 10:30:00").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_flexible_datetime("2024-01-15").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_epoch_seconds() {
        let dt = parse_flexible_datetime("1705314600").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        assert!(parse_flexible_datetime("  2024-01-15  ").is_some());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_flexible_datetime("not a date").is_none());
        assert!(parse_flexible_datetime("2024-13-01").is_none());
        assert!(parse_flexible_datetime("").is_none());
    }

    #[test]
    fn test_parse_duration_hms_forms() {
        assert_eq!(parse_duration_hms("01:02:03"), Some(3723));
        assert_eq!(parse_duration_hms("45:30"), Some(2730));
        assert_eq!(parse_duration_hms("3600"), Some(3600));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration_hms(""), None);
        assert_eq!(parse_duration_hms("abc"), None);
        assert_eq!(parse_duration_hms("1:2:3:4"), None);
    }

    #[test]
    fn test_format_duration_with_hours() {
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_format_duration_under_an_hour() {
        assert_eq!(format_duration(2730), "45:30");
        assert_eq!(format_duration(59), "0:59");
    }
}
