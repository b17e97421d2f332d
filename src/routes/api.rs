// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes: venue listing, token check and record upload.

use crate::error::{AppError, Result};
use crate::models::{Track, UploadProgress, UploadResult, User, VerificationResult};
use crate::services::verification::check_required_fields;
use crate::services::{ProgressLog, UploadService, VerificationService};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Two base64 photos plus an optional inline track.
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/routes", get(get_routes))
        .route("/api/verify", post(verify_token))
        .route(
            "/api/upload",
            post(upload_record).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

// ─── Venues ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoutesResponse {
    pub routes: Vec<String>,
}

/// List the venue names a user can pick from.
async fn get_routes(State(state): State<Arc<AppState>>) -> Json<RoutesResponse> {
    Json(RoutesResponse {
        routes: state.catalog.route_names(),
    })
}

// ─── Token Check ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: String,
}

/// Check a token (and the configured tenant) without uploading anything.
async fn verify_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerificationResult> {
    let verification = VerificationService::new(state.connector.clone());
    Json(
        verification
            .validate_token_only(&request.token, &state.headers)
            .await,
    )
}

// ─── Upload ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub user: User,
    /// Start photo, base64 (a `data:` URL prefix is accepted)
    pub start_image: String,
    /// Finish photo, base64
    pub finish_image: String,
    /// Replaces the venue's recorded track when `user.customTrack.enable` is set
    #[serde(default)]
    pub custom_track: Option<Track>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub result: UploadResult,
    pub progress: Vec<UploadProgress>,
}

/// Run one upload attempt and return its result with every progress event.
///
/// Malformed requests (bad base64, missing fields, unknown venue) are
/// rejected before any call to the exercise service.
async fn upload_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let start_image = decode_image(&request.start_image, "startImage")?;
    let finish_image = decode_image(&request.finish_image, "finishImage")?;

    let user = request.user;
    check_required_fields(&user).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let route = state.catalog.route(&user.route)?;
    let track = if user.custom_track.enable {
        let track = request.custom_track.ok_or_else(|| {
            AppError::BadRequest("Custom track enabled but no track supplied".to_string())
        })?;
        tracing::info!(
            route = %route.name,
            label = %user.custom_track.file_path,
            "Using custom track"
        );
        Arc::new(track)
    } else {
        state.catalog.track(&route.name)?
    };

    let progress = Arc::new(ProgressLog::new());
    let service = UploadService::new(
        state.connector.clone(),
        progress.clone(),
        state.config.local_offset,
    );
    let result = service
        .upload_exercise_record(
            &user,
            &state.headers,
            route,
            &track,
            &start_image,
            &finish_image,
        )
        .await;

    Ok(Json(UploadResponse {
        result,
        progress: progress.events(),
    }))
}

/// Decode a base64 photo, accepting an optional `data:<mime>;base64,` prefix.
fn decode_image(raw: &str, field: &str) -> Result<Vec<u8>> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::BadRequest(format!("'{}' is not a base64 data URL", field)))?,
        None => raw,
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AppError::BadRequest(format!("Invalid base64 in '{}'", field)))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest(format!("'{}' is empty", field)));
    }
    Ok(bytes)
}
