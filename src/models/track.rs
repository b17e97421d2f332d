// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recorded GPS tracks.

use serde::{Deserialize, Serialize};

/// One GPS sample. Serialized exactly as the exercise service expects
/// inside `strLatitudeLongitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "sortNum")]
    pub sequence: u32,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, sequence: u32) -> Self {
        Self {
            latitude,
            longitude,
            sequence,
        }
    }
}

/// Summary written by the GPS recorder alongside the samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Distance integrated by the recorder (meters)
    #[serde(rename = "totalDistance")]
    pub total_distance_meters: f64,
    /// Session duration (seconds)
    #[serde(rename = "totalTime")]
    pub total_time_seconds: u64,
    #[serde(rename = "sampleTimeInterval")]
    pub sample_interval_seconds: f64,
    #[serde(rename = "pointCount")]
    pub point_count: u32,
    /// Recording timestamp (ISO 8601)
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// An ordered GPS track. Point order is temporal order and is never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "track")]
    pub points: Vec<GeoPoint>,
    pub metadata: TrackMetadata,
}

impl Track {
    /// The recorder's own distance in kilometres, if it recorded a usable one.
    pub fn recorded_distance_km(&self) -> Option<f64> {
        let meters = self.metadata.total_distance_meters;
        (meters.is_finite() && meters > 0.0).then(|| meters / 1000.0)
    }
}
