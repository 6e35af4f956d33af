use std::{collections::HashMap, future::Future};

use chrono::Utc;
use serde_derive::Serialize;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};

use crate::{
    data_types::{
        common::{Endpoint, Location, Point},
        route::{RouteResult, RouteSummary},
    },
    error::GeolocationError,
    logln, logvbln,
    services::geolocation::PositionOptions,
    sync::{RequestTag, SyncState, Synchronizer, Ticket},
    util::{config::Config, facilities::Facilities, geo::GeoUtils},
};

use self::theme::Theme;

pub mod theme;

pub const UNSUPPORTED_ALERT: &str = "Navigation not supported";

/// Everything that can change a session. Timers, fetches and lookups the
/// session starts report back through the same channel.
#[derive(Debug)]
pub enum Event {
    /// `label: None` means the marker was dragged and needs a name looked up.
    SetEndpoint {
        endpoint: Endpoint,
        point: Point,
        label: Option<String>,
    },
    ClearEndpoint(Endpoint),
    DebounceElapsed {
        endpoint: Endpoint,
        generation: u64,
    },
    RouteFetched {
        tag: RequestTag,
        result: RouteResult,
    },
    /// `lookup` numbers the request per endpoint; only the newest may land.
    LabelResolved {
        endpoint: Endpoint,
        lookup: u64,
        label: Option<String>,
    },
    SetNaturalCycle(bool),
    SetDark(bool),
    DaylightChecked {
        check: u64,
        dark: bool,
    },
    LocationResolved(Result<Point, GeolocationError>),
    DismissAlert,
}

/// What a renderer needs to draw the map.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MapSnapshot {
    pub origin: Option<Point>,
    pub destination: Option<Point>,
    pub origin_label: String,
    pub destination_label: String,
    pub route: RouteResult,
    pub summary: Option<RouteSummary>,
    /// South-west and north-east corners of the route, for fitting the view.
    pub bounds: Option<(Point, Point)>,
    pub state: SyncState,
    pub dark: bool,
    pub natural_cycle: bool,
    pub style_url: String,
    pub lamp_tiles: String,
    pub location: Location,
    pub alert: Option<String>,
}

/// The single owner of all map state.
///
/// Events are applied one at a time on the session's own task; anything slow
/// runs as a separate task whose outcome comes back as another event. A
/// snapshot is published whenever an event changed what a renderer would see.
pub struct Session {
    config: Config,
    facilities: Facilities,
    sync: Synchronizer,
    labels: HashMap<Endpoint, String>,
    label_lookups: HashMap<Endpoint, u64>,
    theme: Theme,
    location: Location,
    alert: Option<String>,
    events: mpsc::WeakUnboundedSender<Event>,
    inbox: mpsc::UnboundedReceiver<Event>,
    snapshots: watch::Sender<MapSnapshot>,
}

impl Session {
    const CC: &str = "Session";

    pub fn new(config: Config, facilities: Facilities) -> (Self, SessionHandle) {
        let (events, inbox) = mpsc::unbounded_channel();
        let (snapshots, watcher) = watch::channel(MapSnapshot::default());

        let session = Self {
            sync: Synchronizer::new(config.sync.debounce()),
            config,
            facilities,
            labels: HashMap::new(),
            label_lookups: HashMap::new(),
            theme: Theme::default(),
            location: Location::undetermined(),
            alert: None,
            events: events.downgrade(),
            inbox,
            snapshots,
        };
        session.publish();

        (
            session,
            SessionHandle {
                events,
                snapshots: watcher,
            },
        )
    }

    /// Starts the session on the current tokio runtime.
    pub fn spawn(config: Config, facilities: Facilities) -> SessionHandle {
        let (session, handle) = Session::new(config, facilities);
        tokio::spawn(session.run());
        handle
    }

    /// Runs until every handle is dropped and no started work is left.
    pub async fn run(mut self) {
        self.start();
        self.publish();

        while let Some(event) = self.inbox.recv().await {
            self.handle(event);
            self.publish();
        }

        logln!("Session finished");
    }

    fn start(&mut self) {
        self.locate();
        let check = self.theme.begin_check();
        self.check_daylight(check);
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::SetEndpoint {
                endpoint,
                point,
                label,
            } => {
                let ticket = self.sync.update(endpoint, point, Instant::now());
                self.schedule_settle(endpoint, ticket);

                let lookup = self.next_label_lookup(endpoint);
                match label {
                    Some(label) => {
                        self.labels.insert(endpoint, label);
                    }
                    None => {
                        self.labels.insert(endpoint, String::new());
                        self.resolve_label(endpoint, point, lookup);
                    }
                }
            }
            Event::ClearEndpoint(endpoint) => {
                logvbln!("Endpoint {} cleared", endpoint);
                self.sync.clear(endpoint);
                self.labels.remove(&endpoint);
                self.next_label_lookup(endpoint);
            }
            Event::DebounceElapsed {
                endpoint,
                generation,
            } => {
                if let Some(tag) = self.sync.settle(endpoint, generation) {
                    self.start_fetch(tag);
                }
            }
            Event::RouteFetched { tag, result } => {
                if self.sync.complete(&tag, result) {
                    logln!("Route #{} is current", tag.id);
                }
            }
            Event::LabelResolved {
                endpoint,
                lookup,
                label,
            } => {
                // the marker moved, was cleared or got a picked label meanwhile
                if self.label_lookups.get(&endpoint) == Some(&lookup) {
                    self.labels.insert(endpoint, label.unwrap_or_default());
                } else {
                    logvbln!("Dropping label lookup #{} for {}", lookup, endpoint);
                }
            }
            Event::SetNaturalCycle(enabled) => {
                let check = self.theme.set_natural_cycle(enabled);
                self.check_daylight(check);
            }
            Event::SetDark(dark) => {
                if !self.theme.set_dark(dark) {
                    logvbln!("Manual theme ignored while following daylight");
                }
            }
            Event::DaylightChecked { check, dark } => {
                if self.theme.daylight_checked(check, dark) {
                    logvbln!("Daylight check #{}: dark = {}", check, dark);
                }
            }
            Event::LocationResolved(result) => self.apply_location(result),
            Event::DismissAlert => self.alert = None,
        }
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let pair = self.sync.pair();
        let route = self.sync.route().clone();
        let summary = route.route().map(|route| {
            GeoUtils::summarize(&route.geometry, self.config.summary.walking_speed_kmh)
        });
        let bounds = route
            .route()
            .and_then(|route| GeoUtils::get_bounding_box(&route.geometry));
        let dark = self.theme.dark();

        MapSnapshot {
            origin: pair.origin,
            destination: pair.destination,
            origin_label: self.label(Endpoint::Origin),
            destination_label: self.label(Endpoint::Destination),
            route,
            summary,
            bounds,
            state: self.sync.state(),
            dark,
            natural_cycle: self.theme.natural_cycle(),
            style_url: self.config.map.style_url(dark).to_string(),
            lamp_tiles: self.config.map.lamp_tiles.clone(),
            location: self.location,
            alert: self.alert.clone(),
        }
    }

    fn next_label_lookup(&mut self, endpoint: Endpoint) -> u64 {
        let lookup = self.label_lookups.entry(endpoint).or_insert(0);
        *lookup += 1;
        *lookup
    }

    fn label(&self, endpoint: Endpoint) -> String {
        self.labels.get(&endpoint).cloned().unwrap_or_default()
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    /// Runs `work` on its own task and feeds its outcome back as an event.
    fn dispatch<F>(&self, work: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        // nobody left to hear about the outcome
        let Some(events) = self.events.upgrade() else {
            return;
        };

        tokio::spawn(async move {
            let event = work.await;
            let _ = events.send(event);
        });
    }

    fn schedule_settle(&self, endpoint: Endpoint, ticket: Ticket) {
        self.dispatch(async move {
            tokio::time::sleep_until(ticket.due).await;
            Event::DebounceElapsed {
                endpoint,
                generation: ticket.generation,
            }
        });
    }

    fn start_fetch(&self, tag: RequestTag) {
        logln!(
            "Requesting route #{} {} -> {}",
            tag.id,
            tag.origin.lon_lat(),
            tag.destination.lon_lat()
        );

        let fetch = self.facilities.routes().fetch_route(tag.origin, tag.destination);
        self.dispatch(async move {
            let result = fetch.await;
            Event::RouteFetched { tag, result }
        });
    }

    fn resolve_label(&self, endpoint: Endpoint, point: Point, lookup: u64) {
        let Some(labels) = self.facilities.labels() else {
            return;
        };

        let request = labels.label(point);
        self.dispatch(async move {
            Event::LabelResolved {
                endpoint,
                lookup,
                label: request.await,
            }
        });
    }

    fn check_daylight(&self, check: Option<u64>) {
        let (Some(check), Some(daylight)) = (check, self.facilities.daylight()) else {
            return;
        };

        let at = self.location.coordinates.unwrap_or(self.config.map.center);
        let lookup = daylight.is_dark(at, Utc::now());
        self.dispatch(async move {
            Event::DaylightChecked {
                check,
                dark: lookup.await,
            }
        });
    }

    fn locate(&mut self) {
        let Some(provider) = self.facilities.geolocation() else {
            if self.facilities.host_reports_location() {
                logvbln!("Waiting for the host to report a position");
            } else {
                self.apply_location(Err(GeolocationError::Unsupported));
            }
            return;
        };

        let options = PositionOptions::from(&self.config.geolocation);
        let lookup = provider.current_position(options);
        self.dispatch(async move {
            let result = match tokio::time::timeout(options.timeout, lookup).await {
                Ok(result) => result,
                Err(_) => Err(GeolocationError::Timeout),
            };
            Event::LocationResolved(result)
        });
    }

    fn apply_location(&mut self, result: Result<Point, GeolocationError>) {
        match result {
            Ok(point) => {
                logln!("User located at {}", point.lon_lat());
                self.location = Location::determined(point);
                if self.alert.as_deref() == Some(UNSUPPORTED_ALERT) {
                    self.alert = None;
                }

                let check = self.theme.begin_check();
                self.check_daylight(check);
            }
            Err(err) => {
                logln!("Location unknown: {}", err);
                self.location = Location::undetermined();

                if err == GeolocationError::Unsupported {
                    self.alert = Some(UNSUPPORTED_ALERT.to_string());
                }
            }
        }
    }
}

/// Cheap, clonable access to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<MapSnapshot>,
}

impl SessionHandle {
    /// False once the session has stopped.
    pub fn send(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }

    /// Marker dropped at `point`; its label is looked up.
    pub fn drag_endpoint(&self, endpoint: Endpoint, point: Point) -> bool {
        self.send(Event::SetEndpoint {
            endpoint,
            point,
            label: None,
        })
    }

    /// Endpoint picked from search results, which already carry a name.
    pub fn select_endpoint(&self, endpoint: Endpoint, point: Point, label: String) -> bool {
        self.send(Event::SetEndpoint {
            endpoint,
            point,
            label: Some(label),
        })
    }

    pub fn clear_endpoint(&self, endpoint: Endpoint) -> bool {
        self.send(Event::ClearEndpoint(endpoint))
    }

    pub fn set_natural_cycle(&self, enabled: bool) -> bool {
        self.send(Event::SetNaturalCycle(enabled))
    }

    pub fn set_dark(&self, dark: bool) -> bool {
        self.send(Event::SetDark(dark))
    }

    pub fn report_location(&self, result: Result<Point, GeolocationError>) -> bool {
        self.send(Event::LocationResolved(result))
    }

    pub fn dismiss_alert(&self) -> bool {
        self.send(Event::DismissAlert)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits for the first snapshot satisfying `accept`. `None` if the
    /// session stopped first.
    pub async fn wait_for<F>(&mut self, accept: F) -> Option<MapSnapshot>
    where
        F: FnMut(&MapSnapshot) -> bool,
    {
        self.snapshots
            .wait_for(accept)
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }
}
