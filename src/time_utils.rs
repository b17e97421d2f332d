// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and display formatting.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike};

/// Wire format of a record's calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of a record's time of day.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Parse the user's exercise timestamp and express it in the local offset.
///
/// Accepts RFC 3339 (`2024-01-01T08:00:00Z`) as well as the offset-less
/// `2024-01-01T16:00` / `2024-01-01T16:00:00` forms produced by datetime
/// pickers, which are taken to already be local time.
pub fn parse_exercise_timestamp(
    raw: &str,
    local: FixedOffset,
) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&local)),
        Err(rfc_err) => {
            let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
                .map_err(|_| rfc_err)?;
            // A fixed offset maps every naive time to exactly one instant.
            Ok(local.from_local_datetime(&naive).single().unwrap_or_else(|| {
                local.from_utc_datetime(&naive)
            }))
        }
    }
}

/// Format a duration in seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a pace in seconds per kilometre as `M'SS''`.
pub fn format_pace(seconds_per_km: u64) -> String {
    format!("{}'{:02}''", seconds_per_km / 60, seconds_per_km % 60)
}

/// Format the time-of-day part of a timestamp as `HH:MM:SS`.
pub fn format_clock<T: Timelike>(time: &T) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}
