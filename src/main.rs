// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise Uploader API Server
//!
//! Submits completed running sessions, with their photo proofs and GPS
//! track, to the campus fitness-tracking service.

use exercise_uploader::{
    config::Config,
    services::{load_headers, HttpConnector, RouteCatalog},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Exercise Uploader API");

    // Load device headers and the venue catalog
    tracing::info!(data_dir = %config.data_dir.display(), "Loading data files");
    let headers = load_headers(&config.data_dir)?;
    let catalog = RouteCatalog::load(&config.data_dir)?;
    tracing::info!(
        tenant = %headers.tenant,
        routes = catalog.routes().len(),
        "Data files loaded"
    );

    // Shared HTTP client for the exercise service
    let connector = Arc::new(HttpConnector::new(&config)?);
    tracing::info!(
        base_url = %config.api_base_url,
        min_delay_ms = config.request_min_delay.as_millis() as u64,
        max_delay_ms = config.request_max_delay.as_millis() as u64,
        "Exercise service client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        headers,
        catalog,
        connector,
    });

    // Build router
    let app = exercise_uploader::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exercise_uploader=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
