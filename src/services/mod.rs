// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod distance;
pub mod exercise_api;
pub mod record_builder;
pub mod token;
pub mod upload;
pub mod verification;

pub use catalog::{load_custom_track, load_headers, CatalogError, RouteCatalog};
pub use exercise_api::{Connector, ExerciseApi, ExerciseClient, HttpConnector, ImageKind, Pacing};
pub use upload::{ProgressLog, ProgressObserver, UploadService, UploadStage};
pub use verification::VerificationService;
