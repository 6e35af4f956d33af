use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::Point;

/// A route as the routing service returned it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Route {
    pub geometry: Vec<Point>,

    /// Original GeoJSON document, handed to the renderer untouched.
    pub metadata: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum RouteResult {
    #[default]
    Empty,
    Loading,
    Ready(Route),
    Failed(String),
}

impl RouteResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, RouteResult::Ready(_))
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteResult::Ready(route) => Some(route),
            _ => None,
        }
    }

    /// Data for the route line layer: the route document when ready, an empty
    /// feature collection otherwise.
    pub fn as_geojson(&self) -> Value {
        match self {
            RouteResult::Ready(route) => route.metadata.clone(),
            _ => empty_feature_collection(),
        }
    }
}

pub fn empty_feature_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": []
    })
}

/// What the info card shows for a ready route.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub length_m: f64,
    pub duration_min: u32,
}

impl RouteSummary {
    pub fn formatted_length(&self) -> String {
        if self.length_m > 1000.0 {
            format!("{:.2} km", self.length_m / 1000.0)
        } else {
            format!("{} m", self.length_m.round() as i64)
        }
    }

    pub fn formatted_time(&self) -> String {
        format!("{} min", self.duration_min)
    }
}
