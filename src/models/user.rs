// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-supplied upload settings and device identity headers.

use serde::{Deserialize, Serialize};

/// What the user filled in for one upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Pre-issued service credential (three-part token)
    pub token: String,
    /// Exercise start (RFC 3339, or local `YYYY-MM-DDTHH:MM`)
    pub date_time: String,
    /// File name of the start photo
    pub start_image: String,
    /// File name of the finish photo
    pub finish_image: String,
    /// Selected venue name
    pub route: String,
    #[serde(default)]
    pub custom_track: CustomTrack,
}

/// Whether a user-provided track replaces the venue's recorded track.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTrack {
    pub enable: bool,
    /// Label of the uploaded track file
    #[serde(default)]
    pub file_path: String,
}

/// Device/tenant identity strings loaded from `headers.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeaders {
    pub user_agent: String,
    pub miniapp_version: String,
    pub referer: String,
    /// Organization code of the user's institution
    pub tenant: String,
}
