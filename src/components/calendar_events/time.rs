use crate::error::{request_error, ToolResult};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Midnight with a UTC marker, e.g. `2024-01-01T00:00:00Z`
const RANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a start date. `YYYY-MM-DD` is expected; a full ISO date-time is accepted and truncated.
pub fn parse_start_date(start: Option<&str>) -> ToolResult<NaiveDate> {
    let start = start
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| request_error("start date is required (format YYYY-MM-DD)"))?;

    if let Ok(date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") {
        return Ok(date);
    }
    // Offset-qualified forms keep the calendar date as written, not converted to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Ok(dt.date_naive());
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(start, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(start, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| {
            request_error(&format!(
                "Invalid start date '{}', expected format YYYY-MM-DD",
                start
            ))
        })
}

/// Format a date truncated to midnight with the UTC marker
pub fn midnight_utc(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.format(RANGE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `startDateTime` and `endDateTime` for a window of `offset_day` days from `start`
pub fn date_range(start: NaiveDate, offset_day: i64) -> ToolResult<(String, String)> {
    if offset_day < 1 {
        return Err(request_error(&format!(
            "offset_day must be at least 1, got {}",
            offset_day
        )));
    }
    let end = start
        .checked_add_days(Days::new(offset_day as u64))
        .ok_or_else(|| request_error("offset_day is out of range"))?;

    Ok((midnight_utc(start), midnight_utc(end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_date_range() {
        let start = parse_start_date(Some("2024-01-01")).unwrap();
        let (from, to) = date_range(start, 5).unwrap();
        assert_eq!(from, "2024-01-01T00:00:00Z");
        assert_eq!(to, "2024-01-06T00:00:00Z");
    }

    #[test]
    fn test_date_range_crosses_month() {
        let start = parse_start_date(Some("2024-02-27")).unwrap();
        let (_, to) = date_range(start, 3).unwrap();
        assert_eq!(to, "2024-03-01T00:00:00Z");
    }

    #[test]
    fn test_datetime_start_is_truncated() {
        let start = parse_start_date(Some("2024-01-01T15:30:00")).unwrap();
        assert_eq!(midnight_utc(start), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_offset_and_space_separated_starts() {
        for start in [
            "2024-01-01T10:00:00Z",
            "2024-01-01T10:00:00+02:00",
            "2024-01-01T23:30:00.123-05:00",
            "2024-01-01 10:00:00",
            "2024-01-01 10:00:00+02:00",
            "2024-01-01T10:00",
        ] {
            let date = parse_start_date(Some(start)).unwrap();
            assert_eq!(midnight_utc(date), "2024-01-01T00:00:00Z", "start {}", start);
        }
    }

    #[test]
    fn test_malformed_start() {
        assert!(matches!(
            parse_start_date(Some("not-a-date")),
            Err(Error::RequestConstruction(_))
        ));
        assert!(matches!(parse_start_date(Some("2024-13-01")), Err(Error::RequestConstruction(_))));
    }

    #[test]
    fn test_missing_start() {
        assert!(matches!(parse_start_date(None), Err(Error::RequestConstruction(_))));
        assert!(matches!(parse_start_date(Some("  ")), Err(Error::RequestConstruction(_))));
    }

    #[test]
    fn test_non_positive_offset_rejected() {
        let start = parse_start_date(Some("2024-01-01")).unwrap();
        assert!(date_range(start, 0).is_err());
        assert!(date_range(start, -2).is_err());
    }
}
