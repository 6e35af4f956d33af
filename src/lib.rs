use data_types::{
    common::{Endpoint, Point},
    geocode::{with_current_location, SuggestKind, Suggestion},
};
use error::FetchError;
use services::geocoder::Geocoder;
use session::{MapSnapshot, Session, SessionHandle};
use sync::SyncState;
use util::{config::Config, facilities::DependenciesBuilder, http::HttpClient, logging};

pub mod data_types;
pub mod error;
pub mod services;
pub mod session;
pub mod sync;
pub mod util;

/// A running map session plus the search side, wired from a [`Config`].
pub struct App {
    config: Config,
    session: SessionHandle,
    geocoder: Option<Geocoder>,
}

impl App {
    const CC: &str = "App";

    /// Spawns the session; needs a tokio runtime.
    pub fn start(config: Config) -> Self {
        App::launch(config, DependenciesBuilder::from_config)
    }

    /// Like [`App::start`], for hosts that push positions in through
    /// [`SessionHandle::report_location`], such as a browser behind the local
    /// server.
    pub fn start_hosted(config: Config) -> Self {
        App::launch(config, |config| {
            DependenciesBuilder::from_config(config).with_host_location()
        })
    }

    fn launch<F>(config: Config, wire: F) -> Self
    where
        F: FnOnce(&Config) -> DependenciesBuilder,
    {
        logging::apply(&config.logging);

        let facilities = wire(&config).build();
        let geocoder = if config.geocoding.api_key.is_empty() {
            None
        } else {
            Some(Geocoder::new(
                &config.geocoding.base_url,
                &config.geocoding.api_key,
                HttpClient::new(config.http.timeout()),
            ))
        };

        logln!("Routing through {}", config.routing.base_url);

        Self {
            session: Session::spawn(config.clone(), facilities),
            config,
            geocoder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Search options for an endpoint field, biased to the user's location and
    /// led by the "my location" entry when it is known.
    pub async fn suggest(&self, endpoint: Endpoint, text: &str) -> Result<Vec<Suggestion>, FetchError> {
        let location = self.session.snapshot().location;
        let found = match &self.geocoder {
            Some(geocoder) => {
                geocoder
                    .suggest(text, SuggestKind::from(endpoint), location.coordinates)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(with_current_location(&location, found))
    }

    /// Places both markers and waits until the route for them settles. Only
    /// meant for a session with no earlier route.
    pub async fn route_between(&self, origin: Point, destination: Point) -> Option<MapSnapshot> {
        let mut session = self.session();
        session.drag_endpoint(Endpoint::Origin, origin);
        session.drag_endpoint(Endpoint::Destination, destination);

        session
            .wait_for(|snapshot| {
                snapshot.state == SyncState::Settled
                    && snapshot.origin == Some(origin)
                    && snapshot.destination == Some(destination)
            })
            .await
    }
}
