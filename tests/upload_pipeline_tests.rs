// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end upload pipeline tests against a fake service.

use chrono::FixedOffset;
use exercise_uploader::models::{RecordStatus, UploadProgress, UploadResult, User};
use exercise_uploader::services::{ImageKind, ProgressLog, UploadService};
use std::sync::Arc;

mod common;

use common::{
    complete_user, sample_track, student_token, test_headers, track_a, FakeBehavior,
    FakeConnector, FakeExerciseService,
};

const START_PHOTO: &[u8] = b"\xFF\xD8start";
const FINISH_PHOTO: &[u8] = b"\xFF\xD8finish";

fn china() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

async fn run_upload(
    behavior: FakeBehavior,
    user: &User,
) -> (UploadResult, Vec<UploadProgress>, Arc<FakeExerciseService>) {
    let (connector, service) = FakeConnector::new(behavior);
    let progress = Arc::new(ProgressLog::new());
    let uploader = UploadService::new(connector, progress.clone(), china());

    let result = uploader
        .upload_exercise_record(
            user,
            &test_headers(),
            &track_a(),
            &sample_track(),
            START_PHOTO,
            FINISH_PHOTO,
        )
        .await;

    (result, progress.events(), service)
}

fn steps(events: &[UploadProgress]) -> Vec<(&str, bool)> {
    events
        .iter()
        .map(|e| (e.step_label.as_str(), e.completed))
        .collect()
}

#[tokio::test]
async fn test_successful_upload() {
    let user = complete_user(&student_token());
    let (result, events, service) = run_upload(FakeBehavior::default(), &user).await;

    assert_eq!(result, UploadResult::succeeded("rec-001".to_string()));
    assert_eq!(
        steps(&events),
        vec![
            ("Validating configuration", false),
            ("Validating configuration", true),
            ("Uploading start image", false),
            ("Uploading start image", true),
            ("Uploading finish image", false),
            ("Uploading finish image", true),
            ("Creating start record", false),
            ("Creating start record", true),
            ("Creating finish record", false),
            ("Creating finish record", true),
            ("Upload completed", true),
        ]
    );
    assert!(events.iter().all(|e| e.error.is_none()));
    assert_eq!(
        service.calls(),
        vec![
            "check_token",
            "check_tenant:test-tenant",
            "upload_start_image",
            "upload_finish_image",
            "submit_start_record",
            "submit_finish_record",
        ]
    );
}

#[tokio::test]
async fn test_photos_uploaded_as_jpeg_files() {
    let user = complete_user(&student_token());
    let (_, _, service) = run_upload(FakeBehavior::default(), &user).await;

    let uploads = service.uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].0, ImageKind::Start);
    assert_eq!(uploads[0].1, START_PHOTO);
    assert_eq!(uploads[0].2, "1.jpg");
    assert_eq!(uploads[1].0, ImageKind::Finish);
    assert_eq!(uploads[1].1, FINISH_PHOTO);
}

#[tokio::test]
async fn test_records_carry_session_data() {
    let user = complete_user(&student_token());
    let (_, _, service) = run_upload(FakeBehavior::default(), &user).await;

    let start = &service.start_records()[0];
    assert_eq!(start.record_time, "2024-01-01");
    assert_eq!(start.start_time, "16:00:00");
    assert_eq!(start.student_id, "12345");
    assert_eq!(start.start_image, "img/start-ref.jpg");
    assert_eq!(start.end_time, "");
    assert_eq!(start.str_latitude_longitude, "[]");

    let finish = &service.finish_records()[0];
    assert_eq!(finish.id(), "rec-001");
    assert_eq!(finish.status(), RecordStatus::Finished);
    let record = finish.record();
    assert_eq!(record.start_image, "img/start-ref.jpg");
    assert_eq!(record.end_image, "img/finish-ref.jpg");
    assert_eq!(record.route_kilometre, "2.00");
    assert_eq!(record.speed, "5'00''");
    assert_eq!(record.calorie, "124");
    assert_eq!(record.disp_time_text, "00:10:00");
    assert_eq!(record.exercise_times, "600");
    assert_eq!(record.end_time, "16:10:00");
    assert!(record.str_latitude_longitude.starts_with(r#"[{"lat":31.888,"lng":118.819,"sortNum":1}"#));
}

#[tokio::test]
async fn test_failed_start_image_stops_pipeline() {
    let user = complete_user(&student_token());
    let (result, events, service) = run_upload(
        FakeBehavior {
            fail_start_image: true,
            ..FakeBehavior::default()
        },
        &user,
    )
    .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Network error: connection reset"));
    assert!(result.record_id.is_none());

    assert_eq!(
        steps(&events),
        vec![
            ("Validating configuration", false),
            ("Validating configuration", true),
            ("Uploading start image", false),
            ("Upload failed", false),
        ]
    );
    let last = events.last().unwrap();
    assert_eq!(last.error.as_deref(), Some("Network error: connection reset"));

    assert!(service.start_records().is_empty());
    assert!(service.finish_records().is_empty());
    assert!(!service.calls().iter().any(|c| c.starts_with("submit_")));
}

#[tokio::test]
async fn test_validation_failure_stops_before_uploads() {
    let user = User {
        finish_image: String::new(),
        ..complete_user(&student_token())
    };
    let (result, events, service) = run_upload(FakeBehavior::default(), &user).await;

    assert_eq!(result, UploadResult::failed("Finish image is required"));
    assert_eq!(
        steps(&events),
        vec![("Validating configuration", false), ("Upload failed", false)]
    );
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_timestamp_fails_validation_stage() {
    let user = User {
        date_time: "next tuesday".to_string(),
        ..complete_user(&student_token())
    };
    let (result, events, service) = run_upload(FakeBehavior::default(), &user).await;

    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Invalid exercise timestamp"));
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].step_label, "Validating configuration");
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_remote_start_record_error() {
    let user = complete_user(&student_token());
    let (result, events, service) = run_upload(
        FakeBehavior {
            fail_start_record: true,
            ..FakeBehavior::default()
        },
        &user,
    )
    .await;

    assert_eq!(
        result.error.as_deref(),
        Some("API Error (1001): Outside the allowed time window")
    );
    let failed_at = &events[events.len() - 2];
    assert_eq!(failed_at.step_label, "Creating start record");
    assert!(!failed_at.completed);
    assert!(service.finish_records().is_empty());
}

#[tokio::test]
async fn test_declined_finish_record_is_failure() {
    let user = complete_user(&student_token());
    let (result, events, _service) = run_upload(
        FakeBehavior {
            decline_finish_record: true,
            ..FakeBehavior::default()
        },
        &user,
    )
    .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Finish record rec-001 was not accepted")
    );
    assert_eq!(events.last().unwrap().step_label, "Upload failed");
    assert!(!events
        .iter()
        .any(|e| e.step_label == "Creating finish record" && e.completed));
}

#[tokio::test]
async fn test_concurrent_uploads_are_isolated() {
    let token = student_token();
    let first = complete_user(&token);
    let second = User {
        start_image: String::new(),
        ..complete_user(&token)
    };

    let ((ok, ok_events, _), (failed, failed_events, _)) = tokio::join!(
        run_upload(FakeBehavior::default(), &first),
        run_upload(FakeBehavior::default(), &second)
    );

    assert!(ok.success);
    assert_eq!(ok_events.len(), 11);
    assert!(!failed.success);
    assert_eq!(failed_events.len(), 2);
}
