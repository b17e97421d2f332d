// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise uploader: submit completed running sessions to the campus
//! fitness-tracking service.
//!
//! This crate verifies a user's credentials, uploads the two photographic
//! proofs and posts the start/finish record pair computed from a GPS track.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use models::RequestHeaders;
use services::{Connector, RouteCatalog};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Device/tenant identity sent with every request to the exercise service.
    pub headers: RequestHeaders,
    pub catalog: RouteCatalog,
    pub connector: Arc<dyn Connector>,
}
