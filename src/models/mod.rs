// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod progress;
pub mod record;
pub mod route;
pub mod track;
pub mod user;

pub use progress::{UploadProgress, UploadResult, VerificationResult};
pub use record::{FinishRecord, RecordStatus, StartRecord};
pub use route::{RouteDefinition, RouteGroup};
pub use track::{GeoPoint, Track, TrackMetadata};
pub use user::{CustomTrack, RequestHeaders, User};
