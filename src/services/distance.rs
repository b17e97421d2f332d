// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distances over GPS tracks.

use geo::{Distance, HaversineMeasure, Length, LineString, Point};

use crate::models::GeoPoint;

/// Earth radius used by the exercise service's own distance checks (km).
pub const EARTH_RADIUS_KM: f64 = 6378.13649;

/// Haversine sphere with the service's radius, so results come out in km.
const SERVICE_SPHERE: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_KM);

fn to_point(point: &GeoPoint) -> Point<f64> {
    Point::new(point.longitude, point.latitude)
}

/// Haversine distance between two points, in kilometres.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    SERVICE_SPHERE.distance(to_point(a), to_point(b))
}

/// Total length of a track in kilometres, summing consecutive pairs in the
/// given order. Empty and single-point tracks measure `0.0`.
pub fn track_distance(points: &[GeoPoint]) -> f64 {
    let line: LineString<f64> = points.iter().map(to_point).collect();
    SERVICE_SPHERE.length(&line)
}
