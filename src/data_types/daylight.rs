use chrono::{DateTime, Utc};

/// Sunrise and sunset for one day at one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaylightWindow {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl DaylightWindow {
    pub fn is_dark_at(&self, now: DateTime<Utc>) -> bool {
        now < self.sunrise || now > self.sunset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> DaylightWindow {
        DaylightWindow {
            sunrise: Utc.with_ymd_and_hms(2025, 6, 1, 1, 50, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 6, 1, 18, 5, 0).unwrap(),
        }
    }

    #[test]
    fn light_between_sunrise_and_sunset() {
        let noon = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(!window().is_dark_at(noon));
    }

    #[test]
    fn dark_outside_the_window() {
        let early = Utc.with_ymd_and_hms(2025, 6, 1, 0, 30, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 21, 0, 0).unwrap();
        assert!(window().is_dark_at(early));
        assert!(window().is_dark_at(late));
    }
}
