// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Venue/route definitions from the route catalog.

use serde::{Deserialize, Serialize};

/// A venue the exercise can be recorded at, with the rule it is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Venue name (e.g. "梅园田径场"); also names the track file
    #[serde(rename = "routeName")]
    pub name: String,
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    #[serde(rename = "planId")]
    pub plan_id: String,
    /// Human-readable rule text, sent back verbatim
    #[serde(rename = "routeRule")]
    pub rule_text: String,
    #[serde(rename = "minTime")]
    pub min_time_seconds: u32,
    #[serde(rename = "maxTime")]
    pub max_time_seconds: u32,
    /// Nominal route length in kilometres
    #[serde(rename = "routeDistanceKm")]
    pub distance_km: f64,
    #[serde(rename = "ruleStartTime")]
    pub rule_window_start: String,
    #[serde(rename = "ruleEndTime")]
    pub rule_window_end: String,
}

/// Top-level layout of `routes.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteGroup {
    pub routes: Vec<RouteDefinition>,
}
