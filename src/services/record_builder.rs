// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Builds the start and finish records from a route, a track and the
//! session's timing and identity.
//!
//! Everything here is pure: each call returns a fresh record and never
//! touches its inputs.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};

use crate::models::{FinishRecord, RecordStatus, RouteDefinition, StartRecord, Track};
use crate::services::distance::track_distance;
use crate::time_utils::{format_clock, format_hms, format_pace, CLOCK_FORMAT, DATE_FORMAT};

/// Calories credited per kilometre run.
pub const CALORIE_PER_KM: f64 = 62.0;

/// Track payload of a record whose session has not finished yet.
pub const EMPTY_TRACK_PAYLOAD: &str = "[]";

/// Pace placeholder used before a session finishes or when no distance was covered.
pub const ZERO_PACE: &str = "0'00''";

/// Errors from record construction.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Start record has no server record identifier")]
    MissingRecordId,

    #[error("Invalid exercise timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Start record has an unreadable start time: {0}")]
    InvalidStartTime(String),

    #[error("Exercise duration of {0} seconds is out of range")]
    DurationOutOfRange(u64),

    #[error("Failed to serialize track: {0}")]
    TrackSerialization(String),
}

/// Build the record submitted when the session starts.
pub fn build_start_record(
    route: &RouteDefinition,
    timestamp: &DateTime<FixedOffset>,
    start_image_ref: &str,
    student_id: &str,
) -> StartRecord {
    StartRecord {
        route_name: route.name.clone(),
        rule_id: route.rule_id.clone(),
        plan_id: route.plan_id.clone(),
        record_time: timestamp.format(DATE_FORMAT).to_string(),
        start_time: format_clock(timestamp),
        start_image: start_image_ref.to_string(),
        end_time: String::new(),
        exercise_times: String::new(),
        route_kilometre: String::new(),
        end_image: String::new(),
        str_latitude_longitude: EMPTY_TRACK_PAYLOAD.to_string(),
        route_rule: route.rule_text.clone(),
        max_time: route.max_time_seconds,
        min_time: route.min_time_seconds,
        oroute_kilometre: route.distance_km,
        rule_end_time: route.rule_window_end.clone(),
        rule_start_time: route.rule_window_start.clone(),
        calorie: "0".to_string(),
        speed: ZERO_PACE.to_string(),
        disp_time_text: String::new(),
        student_id: student_id.to_string(),
    }
}

/// Build the record submitted when the session finishes.
///
/// `record_id` is the identifier the service returned for `start`; an
/// empty identifier means the start record was never accepted.
pub fn build_finish_record(
    start: &StartRecord,
    track: &Track,
    finish_image_ref: &str,
    record_id: &str,
    status: RecordStatus,
) -> Result<FinishRecord, RecordError> {
    if record_id.trim().is_empty() {
        return Err(RecordError::MissingRecordId);
    }

    let distance_km = session_distance_km(track);
    let duration_secs = track.metadata.total_time_seconds;
    let pace = pace_seconds_per_km(duration_secs, distance_km);

    let started_at = NaiveDateTime::parse_from_str(
        &format!("{} {}", start.record_time, start.start_time),
        &format!("{} {}", DATE_FORMAT, CLOCK_FORMAT),
    )
    .map_err(|e| RecordError::InvalidStartTime(e.to_string()))?;
    let elapsed = i64::try_from(duration_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or(RecordError::DurationOutOfRange(duration_secs))?;
    let ended_at = started_at
        .checked_add_signed(elapsed)
        .ok_or(RecordError::DurationOutOfRange(duration_secs))?;

    let track_payload = serde_json::to_string(&track.points)
        .map_err(|e| RecordError::TrackSerialization(e.to_string()))?;

    let record = StartRecord {
        end_time: format_clock(&ended_at),
        exercise_times: duration_secs.to_string(),
        route_kilometre: format!("{:.2}", distance_km),
        end_image: finish_image_ref.to_string(),
        str_latitude_longitude: track_payload,
        calorie: calories_burned(distance_km).to_string(),
        speed: format_pace(pace),
        disp_time_text: format_hms(duration_secs),
        ..start.clone()
    };

    Ok(FinishRecord::new(record, record_id.to_string(), status))
}

/// Distance covered in km: the recorder's own figure when it has one,
/// otherwise the haversine sum over the points.
pub fn session_distance_km(track: &Track) -> f64 {
    track
        .recorded_distance_km()
        .unwrap_or_else(|| track_distance(&track.points))
}

/// Seconds per kilometre, rounded; zero when no distance was covered.
pub fn pace_seconds_per_km(duration_secs: u64, distance_km: f64) -> u64 {
    if distance_km > 0.0 {
        (duration_secs as f64 / distance_km).round() as u64
    } else {
        0
    }
}

pub fn calories_burned(distance_km: f64) -> u64 {
    (CALORIE_PER_KM * distance_km).round() as u64
}
