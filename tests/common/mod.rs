// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use exercise_uploader::config::Config;
use exercise_uploader::error::UploadError;
use exercise_uploader::models::{
    FinishRecord, GeoPoint, RequestHeaders, RouteDefinition, StartRecord, Track, TrackMetadata,
    User,
};
use exercise_uploader::routes::create_router;
use exercise_uploader::services::{load_headers, Connector, ExerciseApi, ImageKind, RouteCatalog};
use exercise_uploader::AppState;
use std::sync::{Arc, Mutex};

/// Data directory with the test headers, routes and tracks.
#[allow(dead_code)]
pub const FIXTURE_DATA_DIR: &str = "tests/fixtures/data";

/// How the fake exercise service should answer.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct FakeBehavior {
    pub reject_token: bool,
    pub reject_tenant: bool,
    pub fail_start_image: bool,
    pub fail_finish_image: bool,
    pub fail_start_record: bool,
    pub decline_finish_record: bool,
}

/// In-memory stand-in for the exercise service that records every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeExerciseService {
    behavior: FakeBehavior,
    calls: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(ImageKind, Vec<u8>, String)>>,
    start_records: Mutex<Vec<StartRecord>>,
    finish_records: Mutex<Vec<FinishRecord>>,
}

#[allow(dead_code)]
impl FakeExerciseService {
    pub fn new(behavior: FakeBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            ..Self::default()
        })
    }

    /// Remote calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(ImageKind, Vec<u8>, String)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn start_records(&self) -> Vec<StartRecord> {
        self.start_records.lock().unwrap().clone()
    }

    pub fn finish_records(&self) -> Vec<FinishRecord> {
        self.finish_records.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl ExerciseApi for FakeExerciseService {
    async fn check_token(&self) -> Result<(), UploadError> {
        self.record("check_token");
        if self.behavior.reject_token {
            return Err(UploadError::Remote {
                code: 401,
                message: "Token expired".to_string(),
            });
        }
        Ok(())
    }

    async fn check_tenant(&self, tenant: &str) -> Result<(), UploadError> {
        self.record(format!("check_tenant:{}", tenant));
        if self.behavior.reject_tenant {
            return Err(UploadError::Remote {
                code: 500,
                message: "Unknown tenant".to_string(),
            });
        }
        Ok(())
    }

    async fn upload_image(
        &self,
        kind: ImageKind,
        bytes: &[u8],
        filename: &str,
    ) -> Result<String, UploadError> {
        let (call, fail, reference) = match kind {
            ImageKind::Start => (
                "upload_start_image",
                self.behavior.fail_start_image,
                "img/start-ref.jpg",
            ),
            ImageKind::Finish => (
                "upload_finish_image",
                self.behavior.fail_finish_image,
                "img/finish-ref.jpg",
            ),
        };
        self.record(call);
        if fail {
            return Err(UploadError::Transport("connection reset".to_string()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((kind, bytes.to_vec(), filename.to_string()));
        Ok(reference.to_string())
    }

    async fn submit_start_record(&self, record: &StartRecord) -> Result<String, UploadError> {
        self.record("submit_start_record");
        if self.behavior.fail_start_record {
            return Err(UploadError::Remote {
                code: 1001,
                message: "Outside the allowed time window".to_string(),
            });
        }
        self.start_records.lock().unwrap().push(record.clone());
        Ok("rec-001".to_string())
    }

    async fn submit_finish_record(&self, record: &FinishRecord) -> Result<bool, UploadError> {
        self.record("submit_finish_record");
        self.finish_records.lock().unwrap().push(record.clone());
        Ok(!self.behavior.decline_finish_record)
    }
}

/// Hands out the same fake service for every token.
#[allow(dead_code)]
pub struct FakeConnector {
    pub service: Arc<FakeExerciseService>,
}

#[allow(dead_code)]
impl FakeConnector {
    pub fn new(behavior: FakeBehavior) -> (Arc<Self>, Arc<FakeExerciseService>) {
        let service = FakeExerciseService::new(behavior);
        (
            Arc::new(Self {
                service: service.clone(),
            }),
            service,
        )
    }
}

impl Connector for FakeConnector {
    fn connect(
        &self,
        _headers: &RequestHeaders,
        _token: &str,
    ) -> Result<Arc<dyn ExerciseApi>, UploadError> {
        Ok(self.service.clone())
    }
}

/// Mint a three-part token whose payload carries the given claims.
#[allow(dead_code)]
pub fn create_test_token(claims: serde_json::Value) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-service-key"),
    )
    .expect("Failed to create token")
}

/// Token for student 12345.
#[allow(dead_code)]
pub fn student_token() -> String {
    create_test_token(serde_json::json!({
        "userid": "12345",
        "name": "Test Student",
        "account": "213200001",
        "exp": 4102444800u64,
    }))
}

#[allow(dead_code)]
pub fn test_headers() -> RequestHeaders {
    RequestHeaders {
        user_agent: "test-agent/1.0".to_string(),
        miniapp_version: "1.0.0".to_string(),
        referer: "https://example.test/page-frame.html".to_string(),
        tenant: "test-tenant".to_string(),
    }
}

#[allow(dead_code)]
pub fn track_a() -> RouteDefinition {
    RouteDefinition {
        name: "Track A".to_string(),
        rule_id: "R1".to_string(),
        plan_id: "P1".to_string(),
        rule_text: "1 lap".to_string(),
        min_time_seconds: 300,
        max_time_seconds: 3600,
        distance_km: 0.4,
        rule_window_start: "06:00".to_string(),
        rule_window_end: "22:00".to_string(),
    }
}

/// A 2 km, 10 minute session.
#[allow(dead_code)]
pub fn sample_track() -> Track {
    let points = vec![
        GeoPoint::new(31.8880, 118.8190, 1),
        GeoPoint::new(31.8890, 118.8190, 2),
        GeoPoint::new(31.8890, 118.8200, 3),
    ];
    Track {
        metadata: TrackMetadata {
            total_distance_meters: 2000.0,
            total_time_seconds: 600,
            sample_interval_seconds: 300.0,
            point_count: points.len() as u32,
            created_at: "2024-01-01T08:10:00.000Z".to_string(),
        },
        points,
    }
}

#[allow(dead_code)]
pub fn complete_user(token: &str) -> User {
    User {
        token: token.to_string(),
        date_time: "2024-01-01T08:00:00Z".to_string(),
        start_image: "start.jpg".to_string(),
        finish_image: "finish.jpg".to_string(),
        route: "Track A".to_string(),
        ..User::default()
    }
}

/// Create a test app over the fixture data and the given fake service.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    behavior: FakeBehavior,
) -> (axum::Router, Arc<AppState>, Arc<FakeExerciseService>) {
    let config = Config::default();
    let headers = load_headers(&config.data_dir).expect("Failed to load fixture headers");
    let catalog = RouteCatalog::load(&config.data_dir).expect("Failed to load fixture routes");
    let (connector, service) = FakeConnector::new(behavior);

    let state = Arc::new(AppState {
        config,
        headers,
        catalog,
        connector,
    });

    (create_router(state.clone()), state, service)
}
