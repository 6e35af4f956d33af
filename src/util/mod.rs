use chrono::{DateTime, NaiveDate, Utc};

pub mod config;
pub mod facilities;
pub mod geo;
pub mod http;
pub mod logging;
pub mod time;

pub struct DateTimeUtils {}

impl DateTimeUtils {
    /// `YYYY-MM-DD`, the way the daylight service takes its date.
    pub fn date_str(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub fn iso2utc(iso_datetime: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(iso_datetime)
            .ok()
            .map(|datetime| datetime.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso_timestamps_with_offsets_land_in_utc() {
        let parsed = DateTimeUtils::iso2utc("2025-06-01T04:50:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 1, 50, 0).unwrap());
        assert!(DateTimeUtils::iso2utc("sometime tomorrow").is_none());
    }

    #[test]
    fn dates_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(DateTimeUtils::date_str(date), "2025-03-07");
    }
}
