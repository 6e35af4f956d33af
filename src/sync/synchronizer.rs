use std::time::Duration;

use serde_derive::Serialize;
use tokio::time::Instant;

use crate::{
    data_types::{
        common::{CoordinatePair, Endpoint, Point},
        route::RouteResult,
    },
    logvbln,
    sync::debouncer::{Debouncer, Ticket},
};

/// A route request: its id plus the pair it was issued for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTag {
    pub id: u64,
    pub origin: Point,
    pub destination: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// No complete pair, or nothing requested for it yet.
    #[default]
    Idle,
    /// A fetch for the current pair is in flight.
    Pending,
    /// The current pair's fetch finished, successfully or not.
    Settled,
}

/// Keeps the route in step with the two endpoints.
///
/// Markers follow endpoint updates at once; routing follows the debounced
/// values. Each fetch is tagged, and only the newest tag may commit a result,
/// so a slow answer for an old pair never overwrites a newer one. The
/// synchronizer performs no I/O: it hands out debounce tickets and request
/// tags, and the caller reports timer expiries and fetch completions back.
#[derive(Debug)]
pub struct Synchronizer {
    pair: CoordinatePair,
    origin: Debouncer<Option<Point>>,
    destination: Debouncer<Option<Point>>,
    last_fetched: Option<(Point, Point)>,
    in_flight: Option<RequestTag>,
    next_request: u64,
    route: RouteResult,
}

impl Synchronizer {
    const CC: &str = "Synchronizer";

    pub fn new(debounce: Duration) -> Self {
        Self {
            pair: CoordinatePair::default(),
            origin: Debouncer::new(None, debounce),
            destination: Debouncer::new(None, debounce),
            last_fetched: None,
            in_flight: None,
            next_request: 0,
            route: RouteResult::Empty,
        }
    }

    /// Positions for the markers, undebounced.
    pub fn pair(&self) -> CoordinatePair {
        self.pair
    }

    pub fn debounced_pair(&self) -> CoordinatePair {
        CoordinatePair::new(*self.origin.value(), *self.destination.value())
    }

    pub fn route(&self) -> &RouteResult {
        &self.route
    }

    pub fn in_flight(&self) -> Option<&RequestTag> {
        self.in_flight.as_ref()
    }

    pub fn state(&self) -> SyncState {
        if self.in_flight.is_some() {
            return SyncState::Pending;
        }

        match (&self.route, self.pair.complete()) {
            (RouteResult::Ready(_) | RouteResult::Failed(_), Some(_)) => SyncState::Settled,
            _ => SyncState::Idle,
        }
    }

    fn debouncer(&mut self, endpoint: Endpoint) -> &mut Debouncer<Option<Point>> {
        match endpoint {
            Endpoint::Origin => &mut self.origin,
            Endpoint::Destination => &mut self.destination,
        }
    }

    /// User moved or picked `endpoint`. The caller must call [`Self::settle`]
    /// with the returned ticket once it is due.
    pub fn update(&mut self, endpoint: Endpoint, point: Point, now: Instant) -> Ticket {
        self.pair.set(endpoint, Some(point));
        self.debouncer(endpoint).push(Some(point), now)
    }

    /// User cleared `endpoint`. Takes effect immediately: the route goes back
    /// to empty and whatever is in flight will be ignored.
    pub fn clear(&mut self, endpoint: Endpoint) {
        self.pair.set(endpoint, None);
        self.debouncer(endpoint).reset(None);

        if let Some(tag) = self.in_flight.take() {
            logvbln!("Endpoint {} cleared, dropping request #{}", endpoint, tag.id);
        }
        self.last_fetched = None;
        self.route = RouteResult::Empty;
    }

    /// Debounce timer for `endpoint` expired. Returns the fetch to start, if
    /// the settled pair is complete and new.
    pub fn settle(&mut self, endpoint: Endpoint, generation: u64) -> Option<RequestTag> {
        if !self.debouncer(endpoint).settle(generation) {
            return None;
        }

        self.request_if_changed()
    }

    /// Clock-driven alternative to [`Self::settle`].
    pub fn poll(&mut self, now: Instant) -> Option<RequestTag> {
        let origin_settled = self.origin.poll(now);
        let destination_settled = self.destination.poll(now);

        if origin_settled || destination_settled {
            self.request_if_changed()
        } else {
            None
        }
    }

    fn request_if_changed(&mut self) -> Option<RequestTag> {
        let (origin, destination) = self.debounced_pair().complete()?;
        if self.last_fetched == Some((origin, destination)) {
            return None;
        }

        self.next_request += 1;
        let tag = RequestTag {
            id: self.next_request,
            origin,
            destination,
        };

        if let Some(stale) = self.in_flight.replace(tag) {
            logvbln!("Request #{} superseded by #{}", stale.id, tag.id);
        }
        self.last_fetched = Some((origin, destination));
        self.route = RouteResult::Loading;

        Some(tag)
    }

    /// A fetch finished. Returns whether its result became the current route.
    pub fn complete(&mut self, tag: &RequestTag, result: RouteResult) -> bool {
        match self.in_flight {
            Some(current) if current.id == tag.id => {}
            _ => {
                logvbln!("Discarding stale result of request #{}", tag.id);
                return false;
            }
        }

        self.in_flight = None;
        if let RouteResult::Failed(_) = result {
            // no retries, but settling the same pair again may try once more
            self.last_fetched = None;
        }
        self.route = result;

        true
    }
}
