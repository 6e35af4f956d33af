use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::{
    data_types::{
        common::Point,
        route::{Route, RouteResult},
    },
    error::FetchError,
    logln, logvbln,
    util::http::HttpClient,
};

/// Anything that can turn a pair of points into a route.
///
/// Failures are reported in-band as [`RouteResult::Failed`], never as a panic
/// or an error the caller has to unwrap.
pub trait RouteSource: Send + Sync {
    fn fetch_route(&self, origin: Point, destination: Point) -> BoxFuture<'static, RouteResult>;
}

/// Client for the routing backend.
///
/// One GET per call, no retries. The backend answers with a GeoJSON feature
/// collection of line segments in route order.
#[derive(Debug, Clone)]
pub struct RouteFetcher {
    base_url: String,
    http: HttpClient,
}

impl RouteFetcher {
    const CC: &str = "RouteFetcher";

    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn route_url(&self, origin: Point, destination: Point) -> String {
        format!(
            "{}/api/coords={};{}",
            self.base_url,
            origin.lon_lat(),
            destination.lon_lat()
        )
    }

    pub async fn fetch_route(&self, origin: Point, destination: Point) -> RouteResult {
        let url = self.route_url(origin, destination);
        logln!("Fetching route {}", url);

        match self.http.get_json(url).await.and_then(parse_route) {
            Ok(route) => {
                logvbln!("Route ready with {} points", route.geometry.len());
                RouteResult::Ready(route)
            }
            Err(err) => {
                logln!("Route fetch failed: {}", err);
                RouteResult::Failed(err.to_string())
            }
        }
    }
}

impl RouteSource for RouteFetcher {
    fn fetch_route(&self, origin: Point, destination: Point) -> BoxFuture<'static, RouteResult> {
        let fetcher = self.clone();
        Box::pin(async move { RouteFetcher::fetch_route(&fetcher, origin, destination).await })
    }
}

pub fn parse_route(body: Value) -> Result<Route, FetchError> {
    if body.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(FetchError::Malformed(
            "expected a GeoJSON FeatureCollection".to_string(),
        ));
    }

    let features = body
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Malformed("feature collection without features".to_string()))?;

    let mut geometry = Vec::new();
    for feature in features {
        let Some(shape) = feature.get("geometry").filter(|shape| !shape.is_null()) else {
            continue;
        };

        match shape.get("type").and_then(Value::as_str) {
            Some("LineString") => extend_path(&mut geometry, line(coordinates(shape)?)?),
            Some("MultiLineString") => {
                let lines = coordinates(shape)?
                    .as_array()
                    .ok_or_else(|| FetchError::Malformed("MultiLineString is not a list".to_string()))?;
                for part in lines {
                    extend_path(&mut geometry, line(part)?);
                }
            }
            // points, polygons: nothing to draw a path through
            _ => {}
        }
    }

    Ok(Route {
        geometry,
        metadata: body,
    })
}

fn coordinates(shape: &Value) -> Result<&Value, FetchError> {
    shape
        .get("coordinates")
        .ok_or_else(|| FetchError::Malformed("geometry without coordinates".to_string()))
}

fn line(value: &Value) -> Result<Vec<Point>, FetchError> {
    value
        .as_array()
        .ok_or_else(|| FetchError::Malformed("line is not a list of positions".to_string()))?
        .iter()
        .map(position)
        .collect()
}

/// GeoJSON positions are `[lon, lat, (alt)]`.
fn position(value: &Value) -> Result<Point, FetchError> {
    let malformed = || FetchError::Malformed(format!("bad position {}", value));
    let parts = value.as_array().ok_or_else(malformed)?;
    if parts.len() < 2 {
        return Err(malformed());
    }

    let longitude = parts[0].as_f64().ok_or_else(malformed)?;
    let latitude = parts[1].as_f64().ok_or_else(malformed)?;
    Ok(Point::new(latitude, longitude))
}

/// Appends a segment, flipping it when it was stored end-to-start and
/// dropping the joint point both segments share.
fn extend_path(path: &mut Vec<Point>, mut segment: Vec<Point>) {
    if let (Some(end), Some(first), Some(last)) = (path.last(), segment.first(), segment.last()) {
        if first != end && last == end {
            segment.reverse();
        }
    }

    for point in segment {
        if path.last() != Some(&point) {
            path.push(point);
        }
    }
}
