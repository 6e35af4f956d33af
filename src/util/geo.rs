use geo_types::{Coord, LineString};
use std::f64::consts::PI;

use crate::data_types::{common::Point, route::RouteSummary};

pub struct GeoUtils;

impl GeoUtils {
    /// Great-circle distance in kilometres.
    pub fn distance(p1: Point, p2: Point) -> f64 {
        let lat1 = p1.latitude;
        let lat2 = p2.latitude;
        let theta = p2.longitude - p1.longitude;

        let mut dist = GeoUtils::deg2rad(lat1).sin() * GeoUtils::deg2rad(lat2).sin()
            + GeoUtils::deg2rad(lat1).cos()
                * GeoUtils::deg2rad(lat2).cos()
                * GeoUtils::deg2rad(theta).cos();

        // rounding can push identical points just past 1.0
        dist = dist.clamp(-1.0, 1.0).acos();
        dist = GeoUtils::rad2deg(dist);
        dist = dist * 60.0 * 1.1515;
        dist = dist * 1.609344;

        dist
    }

    pub fn deg2rad(deg: f64) -> f64 {
        deg * PI / 180.0
    }

    pub fn rad2deg(rad: f64) -> f64 {
        rad * 180.0 / PI
    }

    pub fn path_length_m(geometry: &[Point]) -> f64 {
        geometry
            .windows(2)
            .map(|pair| GeoUtils::distance(pair[0], pair[1]) * 1000.0)
            .sum()
    }

    pub fn summarize(geometry: &[Point], walking_speed_kmh: f64) -> RouteSummary {
        let length_m = GeoUtils::path_length_m(geometry);
        let duration_min = if walking_speed_kmh > 0.0 {
            (length_m / 1000.0 / walking_speed_kmh * 60.0).ceil() as u32
        } else {
            0
        };

        RouteSummary {
            length_m,
            duration_min,
        }
    }

    /// South-west and north-east corners.
    pub fn get_bounding_box(geometry: &[Point]) -> Option<(Point, Point)> {
        let first = geometry.first()?;
        let mut min = *first;
        let mut max = *first;

        geometry.iter().for_each(|point| {
            min.latitude = point.latitude.min(min.latitude);
            min.longitude = point.longitude.min(min.longitude);

            max.latitude = point.latitude.max(max.latitude);
            max.longitude = point.longitude.max(max.longitude);
        });

        Some((min, max))
    }

    pub fn get_center_of_bbox(left_b: Point, right_top: Point) -> Point {
        Point::new(
            (left_b.latitude + right_top.latitude) / 2.,
            (left_b.longitude + right_top.longitude) / 2.,
        )
    }

    pub fn to_line_string(geometry: &[Point]) -> LineString<f64> {
        geometry.iter().map(|point| Coord::from(*point)).collect()
    }

    pub fn encode_polyline(geometry: &[Point]) -> Result<String, String> {
        polyline::encode_coordinates(GeoUtils::to_line_string(geometry), 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_moscow_points() {
        let km = GeoUtils::distance(Point::new(55.75, 37.61), Point::new(55.76, 37.64));
        assert!((km - 2.18).abs() < 0.05, "{}", km);

        let same = GeoUtils::distance(Point::new(55.75, 37.61), Point::new(55.75, 37.61));
        assert!(same < 1e-3);
    }

    #[test]
    fn summary_uses_walking_speed() {
        let geometry = vec![
            Point::new(55.75, 37.61),
            Point::new(55.755, 37.625),
            Point::new(55.76, 37.64),
        ];
        let summary = GeoUtils::summarize(&geometry, 5.0);
        assert!(summary.length_m > 2000.0 && summary.length_m < 2300.0);
        // 2.1-2.3 km at 5 km/h
        assert!((26..=28).contains(&summary.duration_min));
    }

    #[test]
    fn bounding_box_spans_all_points() {
        let geometry = vec![
            Point::new(55.76, 37.61),
            Point::new(55.75, 37.64),
            Point::new(55.755, 37.62),
        ];
        let (sw, ne) = GeoUtils::get_bounding_box(&geometry).unwrap();
        assert_eq!(sw, Point::new(55.75, 37.61));
        assert_eq!(ne, Point::new(55.76, 37.64));
        let center = GeoUtils::get_center_of_bbox(sw, ne);
        assert!((center.latitude - 55.755).abs() < 1e-9);
        assert!((center.longitude - 37.625).abs() < 1e-9);
        assert!(GeoUtils::get_bounding_box(&[]).is_none());
    }

    #[test]
    fn polyline_keeps_the_points() {
        let geometry = vec![Point::new(55.75, 37.61), Point::new(55.76, 37.64)];
        let encoded = GeoUtils::encode_polyline(&geometry).unwrap();
        let decoded: Vec<Point> = polyline::decode_polyline(&encoded, 5)
            .unwrap()
            .coords()
            .map(|coord| Point::from(*coord))
            .collect();
        assert_eq!(decoded.len(), 2);
        assert!((decoded[1].latitude - 55.76).abs() < 1e-5);
        assert!((decoded[1].longitude - 37.64).abs() < 1e-5);
    }
}
