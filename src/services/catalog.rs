// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Venue catalog: route definitions, recorded tracks and device headers
//! loaded from the data directory.
//!
//! Layout:
//! - `headers.json`: the `RequestHeaders` sent to the exercise service
//! - `routes.json`: `{ "routes": [ ... ] }`
//! - `tracks/<routeName>.json`: the recorded track for each venue

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::{RequestHeaders, RouteDefinition, RouteGroup, Track};

const HEADERS_FILE: &str = "headers.json";
const ROUTES_FILE: &str = "routes.json";
const TRACKS_DIR: &str = "tracks";

/// Route definitions plus a lazily filled track cache.
#[derive(Debug)]
pub struct RouteCatalog {
    data_dir: PathBuf,
    routes: Vec<RouteDefinition>,
    tracks: DashMap<String, Arc<Track>>,
}

impl RouteCatalog {
    /// Load `routes.json` from the data directory. Tracks are read on first use.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, CatalogError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let group: RouteGroup = read_json(&data_dir.join(ROUTES_FILE))?;

        tracing::info!(
            count = group.routes.len(),
            data_dir = %data_dir.display(),
            "Loaded route catalog"
        );
        Ok(Self::from_routes(data_dir, group.routes))
    }

    pub fn from_routes(data_dir: PathBuf, routes: Vec<RouteDefinition>) -> Self {
        Self {
            data_dir,
            routes,
            tracks: DashMap::new(),
        }
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn route_names(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.name.clone()).collect()
    }

    pub fn route(&self, name: &str) -> Result<&RouteDefinition, CatalogError> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CatalogError::UnknownRoute(name.to_string()))
    }

    /// The recorded track for a venue, cached after the first read.
    pub fn track(&self, name: &str) -> Result<Arc<Track>, CatalogError> {
        let route = self.route(name)?;
        if let Some(track) = self.tracks.get(&route.name) {
            return Ok(Arc::clone(&track));
        }

        let path = self
            .data_dir
            .join(TRACKS_DIR)
            .join(format!("{}.json", route.name));
        let track = Arc::new(load_custom_track(&path)?);
        tracing::debug!(route = %route.name, points = track.points.len(), "Cached track");

        // A concurrent first read may have won; either copy is identical.
        let cached = self
            .tracks
            .entry(route.name.clone())
            .or_insert(track)
            .clone();
        Ok(cached)
    }
}

/// Read a track file that is not part of the catalog.
pub fn load_custom_track<P: AsRef<Path>>(path: P) -> Result<Track, CatalogError> {
    read_json(path.as_ref())
}

/// Read the device/tenant headers from the data directory.
pub fn load_headers<P: AsRef<Path>>(data_dir: P) -> Result<RequestHeaders, CatalogError> {
    read_json(&data_dir.as_ref().join(HEADERS_FILE))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| CatalogError::Parse(format!("{}: {}", path.display(), e)))
}

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("Failed to parse JSON: {0}")]
    Parse(String),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),
}
