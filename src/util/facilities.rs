use std::sync::Arc;

use crate::{
    logln,
    services::{
        daylight::{DaylightClient, DaylightSource},
        geocoder::{Geocoder, LabelSource},
        geolocation::{FixedPosition, GeolocationProvider},
        routing::{RouteFetcher, RouteSource},
    },
    util::{config::Config, http::HttpClient},
};

/// External collaborators a session talks to. Only routing is mandatory; the
/// session falls back to empty labels, daylight and an unsupported host
/// positioning service for the others, unless the host reports positions
/// itself.
#[derive(Clone)]
pub struct Facilities {
    routes: Arc<dyn RouteSource>,
    labels: Option<Arc<dyn LabelSource>>,
    daylight: Option<Arc<dyn DaylightSource>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    host_location: bool,
}

impl Facilities {
    pub fn routes(&self) -> &Arc<dyn RouteSource> {
        &self.routes
    }

    pub fn labels(&self) -> Option<&Arc<dyn LabelSource>> {
        self.labels.as_ref()
    }

    pub fn daylight(&self) -> Option<&Arc<dyn DaylightSource>> {
        self.daylight.as_ref()
    }

    pub fn geolocation(&self) -> Option<&Arc<dyn GeolocationProvider>> {
        self.geolocation.as_ref()
    }

    /// Positions arrive as reports from the host rather than on request.
    pub fn host_reports_location(&self) -> bool {
        self.host_location
    }
}

pub struct DependenciesBuilder {
    dependencies: Facilities,
}

impl DependenciesBuilder {
    const CC: &str = "DependenciesBuilder";

    pub fn new(routes: Arc<dyn RouteSource>) -> Self {
        Self {
            dependencies: Facilities {
                routes,
                labels: None,
                daylight: None,
                geolocation: None,
                host_location: false,
            },
        }
    }

    /// The HTTP clients named in `config`. Geolocation is only wired when the
    /// config pins a position.
    pub fn from_config(config: &Config) -> Self {
        let http = HttpClient::new(config.http.timeout());

        let mut builder = DependenciesBuilder::new(Arc::new(RouteFetcher::new(
            &config.routing.base_url,
            http.clone(),
        )))
        .with_daylight(Arc::new(DaylightClient::new(
            &config.daylight.base_url,
            http.clone(),
        )));

        if config.geocoding.api_key.is_empty() {
            logln!("No geocoding api key configured, marker labels disabled");
        } else {
            builder = builder.with_labels(Arc::new(Geocoder::new(
                &config.geocoding.base_url,
                &config.geocoding.api_key,
                http,
            )));
        }

        if let Some(position) = config.geolocation.position {
            builder = builder.with_geolocation(Arc::new(FixedPosition(position)));
        }

        builder
    }

    pub fn with_labels(mut self, labels: Arc<dyn LabelSource>) -> Self {
        self.dependencies.labels = Some(labels);
        self
    }

    pub fn with_daylight(mut self, daylight: Arc<dyn DaylightSource>) -> Self {
        self.dependencies.daylight = Some(daylight);
        self
    }

    pub fn with_geolocation(mut self, geolocation: Arc<dyn GeolocationProvider>) -> Self {
        self.dependencies.geolocation = Some(geolocation);
        self
    }

    pub fn with_host_location(mut self) -> Self {
        self.dependencies.host_location = true;
        self
    }

    pub fn build(self) -> Facilities {
        self.dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::common::Point;

    #[test]
    fn config_decides_optional_collaborators() {
        let facilities = DependenciesBuilder::from_config(&Config::default()).build();
        assert!(facilities.labels().is_none());
        assert!(facilities.daylight().is_some());
        assert!(facilities.geolocation().is_none());
        assert!(!facilities.host_reports_location());

        let facilities = DependenciesBuilder::from_config(&Config::default())
            .with_host_location()
            .build();
        assert!(facilities.host_reports_location());

        let mut config = Config::default();
        config.geocoding.api_key = "KEY".to_string();
        config.geolocation.position = Some(Point::new(55.54, 37.55));
        let facilities = DependenciesBuilder::from_config(&config).build();
        assert!(facilities.labels().is_some());
        assert!(facilities.geolocation().is_some());
    }
}
