use std::fmt::Display;

use geo_types::Coord;
use serde_derive::{Deserialize, Serialize};

/// A WGS84 position. Values are replaced wholesale, never edited in place.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Point {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `lon,lat`, the order every service we talk to expects.
    pub fn lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl From<Point> for Coord {
    fn from(point: Point) -> Self {
        Coord {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<Coord> for Point {
    fn from(coord: Coord) -> Self {
        Point::new(coord.y, coord.x)
    }
}

/// One of the two user-chosen route points.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// "A"
    Origin,
    /// "B"
    Destination,
}

impl Endpoint {
    pub fn letter(&self) -> &'static str {
        match self {
            Endpoint::Origin => "A",
            Endpoint::Destination => "B",
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "a" | "A" => Some(Endpoint::Origin),
            "b" | "B" => Some(Endpoint::Destination),
            _ => None,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct CoordinatePair {
    pub origin: Option<Point>,
    pub destination: Option<Point>,
}

impl CoordinatePair {
    pub fn new(origin: Option<Point>, destination: Option<Point>) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn get(&self, endpoint: Endpoint) -> Option<Point> {
        match endpoint {
            Endpoint::Origin => self.origin,
            Endpoint::Destination => self.destination,
        }
    }

    pub fn set(&mut self, endpoint: Endpoint, point: Option<Point>) {
        match endpoint {
            Endpoint::Origin => self.origin = point,
            Endpoint::Destination => self.destination = point,
        }
    }

    /// Both ends, when the pair can be routed.
    pub fn complete(&self) -> Option<(Point, Point)> {
        match (self.origin, self.destination) {
            (Some(origin), Some(destination)) => Some((origin, destination)),
            _ => None,
        }
    }
}

/// Where the user is, as far as the host could tell.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub determined: bool,
    pub coordinates: Option<Point>,
}

impl Location {
    pub fn determined(point: Point) -> Self {
        Self {
            determined: true,
            coordinates: Some(point),
        }
    }

    pub fn undetermined() -> Self {
        Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_complete_only_with_both_ends() {
        let mut pair = CoordinatePair::default();
        assert!(pair.complete().is_none());

        pair.set(Endpoint::Origin, Some(Point::new(55.75, 37.61)));
        assert!(pair.complete().is_none());

        pair.set(Endpoint::Destination, Some(Point::new(55.76, 37.64)));
        assert_eq!(
            pair.complete(),
            Some((Point::new(55.75, 37.61), Point::new(55.76, 37.64)))
        );

        pair.set(Endpoint::Origin, None);
        assert!(pair.complete().is_none());
    }

    #[test]
    fn points_use_lat_lon_on_the_wire() {
        let point: Point = serde_json::from_str(r#"{"lat": 55.7, "lon": 37.6}"#).unwrap();
        assert_eq!(point, Point::new(55.7, 37.6));
        assert_eq!(point.lon_lat(), "37.6,55.7");
    }
}
