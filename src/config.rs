// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Nothing here is global: the loaded `Config` is handed to the services
//! that need it when they are constructed.

use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::exercise_api::API_BASE_URL;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Base URL of the exercise service
    pub api_base_url: String,
    /// Directory holding `headers.json`, `routes.json` and `tracks/`
    pub data_dir: PathBuf,
    /// Lower bound of the pacing delay applied before each outbound request
    pub request_min_delay: Duration,
    /// Upper bound of the pacing delay applied before each outbound request
    pub request_max_delay: Duration,
    /// Per-request timeout for calls to the exercise service
    pub http_timeout: Duration,
    /// Offset used to render record dates and times of day
    pub local_offset: FixedOffset,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            data_dir: PathBuf::from("tests/fixtures/data"),
            request_min_delay: Duration::ZERO,
            request_max_delay: Duration::ZERO,
            http_timeout: Duration::from_secs(5),
            local_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let min_delay_ms: u64 = parse_var(&lookup, "REQUEST_MIN_DELAY_MS", 1500)?;
        let max_delay_ms: u64 = parse_var(&lookup, "REQUEST_MAX_DELAY_MS", 3500)?;
        if max_delay_ms < min_delay_ms {
            return Err(ConfigError::Invalid {
                name: "REQUEST_MAX_DELAY_MS",
                value: format!("{} (below REQUEST_MIN_DELAY_MS={})", max_delay_ms, min_delay_ms),
            });
        }

        let offset_hours: i32 = parse_var(&lookup, "LOCAL_UTC_OFFSET_HOURS", 8)?;
        let local_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "LOCAL_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            })?;

        Ok(Self {
            port: parse_var(&lookup, "PORT", 8080)?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            api_base_url: lookup("EXERCISE_API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| API_BASE_URL.to_string()),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            request_min_delay: Duration::from_millis(min_delay_ms),
            request_max_delay: Duration::from_millis(max_delay_ms),
            http_timeout: Duration::from_secs(parse_var(&lookup, "HTTP_TIMEOUT_SECS", 30)?),
            local_offset,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base_url, API_BASE_URL);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.request_min_delay, Duration::from_millis(1500));
        assert_eq!(config.request_max_delay, Duration::from_millis(3500));
        assert_eq!(config.local_offset.local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("EXERCISE_API_BASE_URL", "http://localhost:4000/"),
            ("REQUEST_MIN_DELAY_MS", "0"),
            ("REQUEST_MAX_DELAY_MS", "10"),
            ("LOCAL_UTC_OFFSET_HOURS", "-5"),
        ]))
        .expect("Config should load");

        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://localhost:4000");
        assert_eq!(config.request_max_delay, Duration::from_millis(10));
        assert_eq!(config.local_offset.local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_config_rejects_inverted_delay_window() {
        let err = Config::from_lookup(lookup_from(&[
            ("REQUEST_MIN_DELAY_MS", "500"),
            ("REQUEST_MAX_DELAY_MS", "100"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("REQUEST_MAX_DELAY_MS"));
    }

    #[test]
    fn test_config_rejects_garbage_port() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
