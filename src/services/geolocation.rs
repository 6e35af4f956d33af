use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_derive::Deserialize;

use crate::{
    data_types::common::Point, error::GeolocationError, util::config::GeolocationConfig,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
        }
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_millis(config.timeout_ms),
            max_age: Duration::from_millis(config.max_age_ms),
        }
    }
}

/// The host's positioning service. Permission prompts are its business.
pub trait GeolocationProvider: Send + Sync {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> BoxFuture<'static, Result<Point, GeolocationError>>;
}

/// Always reports the same place.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Point);

impl GeolocationProvider for FixedPosition {
    fn current_position(
        &self,
        _options: PositionOptions,
    ) -> BoxFuture<'static, Result<Point, GeolocationError>> {
        let point = self.0;
        Box::pin(async move { Ok(point) })
    }
}

/// A position the host pushes in on its own, such as a browser's
/// `watchPosition` callback: either a point or the error it got.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Position(Point),
    Failure { error: GeolocationError },
}

impl LocationReport {
    pub fn into_result(self) -> Result<Point, GeolocationError> {
        match self {
            LocationReport::Position(point) => Ok(point),
            LocationReport::Failure { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_carry_a_point_or_an_error() {
        let report: LocationReport = serde_json::from_str(r#"{"lat": 55.54, "lon": 37.55}"#).unwrap();
        assert_eq!(report.into_result(), Ok(Point::new(55.54, 37.55)));

        let report: LocationReport = serde_json::from_str(r#"{"error": "permission_denied"}"#).unwrap();
        assert_eq!(report.into_result(), Err(GeolocationError::PermissionDenied));

        assert!(serde_json::from_str::<LocationReport>(r#"{"error": "lost"}"#).is_err());
    }

    #[test]
    fn options_follow_config() {
        let options = PositionOptions::from(&GeolocationConfig::default());
        assert_eq!(options, PositionOptions::default());
    }

    #[tokio::test]
    async fn fixed_position_reports_its_point() {
        let provider = FixedPosition(Point::new(55.54, 37.55));
        let point = provider
            .current_position(PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(point, Point::new(55.54, 37.55));
    }
}
