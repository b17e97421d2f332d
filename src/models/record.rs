// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise records in the exact wire layout of the exercise service.
//!
//! Every field is typed as the service's schema expects it: end-of-session
//! values and the track payload travel as strings, the rule limits and the
//! nominal route length as numbers.

use serde::{Serialize, Serializer};

/// The record posted when a session starts.
///
/// Built only by `services::record_builder`; the finish record embeds a
/// copy with the end-of-session fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRecord {
    pub route_name: String,
    pub rule_id: String,
    pub plan_id: String,
    /// Calendar date (`YYYY-MM-DD`)
    pub record_time: String,
    /// Local time of day (`HH:MM:SS`)
    pub start_time: String,
    /// Server reference of the start photo
    pub start_image: String,
    /// Local time of day (`HH:MM:SS`), empty until finished
    pub end_time: String,
    /// Duration in whole seconds, empty until finished
    pub exercise_times: String,
    /// Distance in km with two decimals, empty until finished
    pub route_kilometre: String,
    /// Server reference of the finish photo, empty until finished
    pub end_image: String,
    /// JSON-encoded `[{lat,lng,sortNum}]`
    pub str_latitude_longitude: String,
    pub route_rule: String,
    pub max_time: u32,
    pub min_time: u32,
    /// Nominal route length in km
    pub oroute_kilometre: f64,
    pub rule_end_time: String,
    pub rule_start_time: String,
    pub calorie: String,
    /// Pace as `M'SS''`
    pub speed: String,
    /// Duration as `HH:MM:SS`
    pub disp_time_text: String,
    pub student_id: String,
}

/// Lifecycle status reported with the finish record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Finished,
}

impl RecordStatus {
    /// Status code understood by the service.
    pub fn code(self) -> u8 {
        match self {
            RecordStatus::Finished => 2,
        }
    }
}

impl Serialize for RecordStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code().to_string())
    }
}

/// The record posted when a session finishes.
///
/// Only constructible through `record_builder::build_finish_record`, which
/// refuses an empty server record identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRecord {
    #[serde(flatten)]
    record: StartRecord,
    /// Identifier the service assigned to the start record
    id: String,
    now_status: RecordStatus,
}

impl FinishRecord {
    pub(crate) fn new(record: StartRecord, id: String, now_status: RecordStatus) -> Self {
        Self {
            record,
            id,
            now_status,
        }
    }

    /// The record body, including the computed end-of-session fields.
    pub fn record(&self) -> &StartRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> RecordStatus {
        self.now_status
    }
}
