use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::BoxFuture;
use serde_derive::Deserialize;
use serde_json::Value;

use crate::{
    data_types::{common::Point, daylight::DaylightWindow},
    error::FetchError,
    logln,
    util::{http::HttpClient, DateTimeUtils},
};

#[derive(Deserialize, Debug)]
struct SunResponse {
    status: String,
    results: Option<SunTimes>,
}

#[derive(Deserialize, Debug)]
struct SunTimes {
    sunrise: String,
    sunset: String,
}

/// Decides whether it is dark at a place and moment. Failures answer `false`.
pub trait DaylightSource: Send + Sync {
    fn is_dark(&self, at: Point, now: DateTime<Utc>) -> BoxFuture<'static, bool>;
}

/// Client for the sunrise-sunset service.
#[derive(Debug, Clone)]
pub struct DaylightClient {
    base_url: String,
    http: HttpClient,
}

impl DaylightClient {
    const CC: &str = "DaylightClient";

    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn window_url(&self, at: Point, date: NaiveDate) -> String {
        format!(
            "{}/json?lat={}&lng={}&date={}&formatted=0",
            self.base_url,
            at.latitude,
            at.longitude,
            DateTimeUtils::date_str(date)
        )
    }

    pub async fn window(&self, at: Point, date: NaiveDate) -> Result<DaylightWindow, FetchError> {
        let body = self.http.get_json(self.window_url(at, date)).await?;
        parse_window(body)
    }

    /// Whether it is dark at `at` right now. Any failure counts as daylight.
    pub async fn is_dark(&self, at: Point, now: DateTime<Utc>) -> bool {
        match self.window(at, now.date_naive()).await {
            Ok(window) => window.is_dark_at(now),
            Err(err) => {
                logln!("Daylight check failed, assuming day: {}", err);
                false
            }
        }
    }
}

impl DaylightSource for DaylightClient {
    fn is_dark(&self, at: Point, now: DateTime<Utc>) -> BoxFuture<'static, bool> {
        let client = self.clone();
        Box::pin(async move { DaylightClient::is_dark(&client, at, now).await })
    }
}

pub fn parse_window(body: Value) -> Result<DaylightWindow, FetchError> {
    let response: SunResponse = serde_json::from_value(body)?;
    if response.status != "OK" {
        return Err(FetchError::Rejected(response.status));
    }

    let times = response
        .results
        .ok_or_else(|| FetchError::Malformed("missing results".to_string()))?;
    let parse = |field: &str, value: &str| {
        DateTimeUtils::iso2utc(value)
            .ok_or_else(|| FetchError::Malformed(format!("bad {} timestamp '{}'", field, value)))
    };

    Ok(DaylightWindow {
        sunrise: parse("sunrise", &times.sunrise)?,
        sunset: parse("sunset", &times.sunset)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn url_asks_for_unformatted_times() {
        let client = DaylightClient::new(
            "https://api.sunrise-sunset.org",
            HttpClient::new(Duration::from_secs(1)),
        );
        let url = client.window_url(
            Point::new(55.54, 37.55),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert_eq!(
            url,
            "https://api.sunrise-sunset.org/json?lat=55.54&lng=37.55&date=2025-06-01&formatted=0"
        );
    }

    #[test]
    fn window_is_read_from_rfc3339_times() {
        let body = json!({
            "results": {
                "sunrise": "2025-06-01T00:48:11+00:00",
                "sunset": "2025-06-01T18:07:40+00:00",
                "day_length": 62369
            },
            "status": "OK"
        });

        let window = parse_window(body).unwrap();
        assert_eq!(window.sunrise, Utc.with_ymd_and_hms(2025, 6, 1, 0, 48, 11).unwrap());
        assert!(!window.is_dark_at(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()));
        assert!(window.is_dark_at(Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap()));
    }

    #[test]
    fn non_ok_status_is_rejected() {
        let body = json!({"results": "", "status": "INVALID_REQUEST"});
        assert!(matches!(parse_window(body), Err(FetchError::Malformed(_)) | Err(FetchError::Rejected(_))));

        let body = json!({"status": "INVALID_DATE"});
        assert!(matches!(parse_window(body), Err(FetchError::Rejected(status)) if status == "INVALID_DATE"));
    }

    #[tokio::test]
    async fn failed_check_means_daylight() {
        let client = DaylightClient::new("http://127.0.0.1:1", HttpClient::new(Duration::from_secs(2)));
        let midnight = Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        assert!(!client.is_dark(Point::new(55.54, 37.55), midnight).await);
    }
}
