// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload orchestration.
//!
//! Runs one upload attempt through its stages:
//! 1. Validate the user's settings and identity
//! 2. Upload the start photo
//! 3. Upload the finish photo
//! 4. Build and submit the start record (the service assigns the record id)
//! 5. Build and submit the finish record
//!
//! Every stage reports `{label, completed: false}` on entry and
//! `{label, completed: true}` on success. The first failure ends the attempt
//! with a single `Upload failed` event; nothing is retried.

use std::sync::{Arc, Mutex};

use chrono::FixedOffset;

use crate::error::UploadError;
use crate::models::{
    RecordStatus, RequestHeaders, RouteDefinition, Track, UploadProgress, UploadResult, User,
};
use crate::services::exercise_api::{Connector, ImageKind, IMAGE_FILENAME};
use crate::services::record_builder::{build_finish_record, build_start_record, RecordError};
use crate::services::token;
use crate::services::verification::{check_required_fields, VerificationService};
use crate::time_utils::parse_exercise_timestamp;

/// Receives progress events as an upload runs.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &UploadProgress);
}

/// Observer that mirrors events to the log and keeps them for the caller.
#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<UploadProgress>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order.
    pub fn events(&self) -> Vec<UploadProgress> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressObserver for ProgressLog {
    fn on_progress(&self, event: &UploadProgress) {
        match &event.error {
            Some(error) => {
                tracing::warn!(step = %event.step_label, error = %error, "Upload step failed")
            }
            None => tracing::info!(
                step = %event.step_label,
                completed = event.completed,
                "Upload progress"
            ),
        }

        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Where an upload attempt is. Stages only move forward; `Failed` can be
/// reached from any stage before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    Validating,
    UploadingStartImage,
    UploadingFinishImage,
    CreatingStartRecord,
    CreatingFinishRecord,
    Done,
    Failed,
}

impl UploadStage {
    pub fn label(self) -> &'static str {
        match self {
            UploadStage::Validating => "Validating configuration",
            UploadStage::UploadingStartImage => "Uploading start image",
            UploadStage::UploadingFinishImage => "Uploading finish image",
            UploadStage::CreatingStartRecord => "Creating start record",
            UploadStage::CreatingFinishRecord => "Creating finish record",
            UploadStage::Done => "Upload completed",
            UploadStage::Failed => "Upload failed",
        }
    }

    /// The stage that follows a successful one. Terminal stages stay put.
    pub fn next(self) -> UploadStage {
        match self {
            UploadStage::Validating => UploadStage::UploadingStartImage,
            UploadStage::UploadingStartImage => UploadStage::UploadingFinishImage,
            UploadStage::UploadingFinishImage => UploadStage::CreatingStartRecord,
            UploadStage::CreatingStartRecord => UploadStage::CreatingFinishRecord,
            UploadStage::CreatingFinishRecord => UploadStage::Done,
            UploadStage::Done => UploadStage::Done,
            UploadStage::Failed => UploadStage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStage::Done | UploadStage::Failed)
    }
}

/// Stage bookkeeping and event emission for one attempt.
struct Pipeline<'a> {
    stage: UploadStage,
    observer: &'a dyn ProgressObserver,
}

impl<'a> Pipeline<'a> {
    fn start(observer: &'a dyn ProgressObserver) -> Self {
        let pipeline = Self {
            stage: UploadStage::Validating,
            observer,
        };
        pipeline.emit(UploadStage::Validating.label(), false, None);
        pipeline
    }

    fn emit(&self, label: &str, completed: bool, error: Option<String>) {
        self.observer.on_progress(&UploadProgress {
            step_label: label.to_string(),
            completed,
            error,
        });
    }

    /// Report the current stage as done and enter the next one.
    fn advance(&mut self) {
        self.emit(self.stage.label(), true, None);
        self.stage = self.stage.next();
        if !self.stage.is_terminal() {
            self.emit(self.stage.label(), false, None);
        }
    }

    fn finish(mut self, record_id: String) -> UploadResult {
        self.advance();
        debug_assert_eq!(self.stage, UploadStage::Done);
        tracing::info!(record_id = %record_id, "Exercise record uploaded");
        self.emit(UploadStage::Done.label(), true, None);
        UploadResult::succeeded(record_id)
    }

    fn fail(mut self, error: UploadError) -> UploadResult {
        let message = error.to_string();
        tracing::warn!(stage = ?self.stage, error = %message, "Upload aborted");
        self.stage = UploadStage::Failed;
        self.emit(UploadStage::Failed.label(), false, Some(message.clone()));
        UploadResult::failed(message)
    }
}

/// Submits one exercise session end to end.
pub struct UploadService {
    connector: Arc<dyn Connector>,
    verification: VerificationService,
    observer: Arc<dyn ProgressObserver>,
    local_offset: FixedOffset,
}

impl UploadService {
    pub fn new(
        connector: Arc<dyn Connector>,
        observer: Arc<dyn ProgressObserver>,
        local_offset: FixedOffset,
    ) -> Self {
        Self {
            verification: VerificationService::new(connector.clone()),
            connector,
            observer,
            local_offset,
        }
    }

    /// Run one upload attempt. Never returns an error: every failure is
    /// reported through the result and a final `Upload failed` event.
    pub async fn upload_exercise_record(
        &self,
        user: &User,
        headers: &RequestHeaders,
        route: &RouteDefinition,
        track: &Track,
        start_image: &[u8],
        finish_image: &[u8],
    ) -> UploadResult {
        tracing::info!(route = %route.name, points = track.points.len(), "Starting upload");

        let mut pipeline = Pipeline::start(self.observer.as_ref());
        let outcome = self
            .run(
                &mut pipeline,
                user,
                headers,
                route,
                track,
                start_image,
                finish_image,
            )
            .await;

        match outcome {
            Ok(record_id) => pipeline.finish(record_id),
            Err(e) => pipeline.fail(e),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        pipeline: &mut Pipeline<'_>,
        user: &User,
        headers: &RequestHeaders,
        route: &RouteDefinition,
        track: &Track,
        start_image: &[u8],
        finish_image: &[u8],
    ) -> Result<String, UploadError> {
        // Local problems are reported before any remote call is made.
        check_required_fields(user)?;
        let timestamp = parse_exercise_timestamp(&user.date_time, self.local_offset)
            .map_err(|e| RecordError::InvalidTimestamp(format!("{:?}: {}", user.date_time, e)))?;

        let verdict = self.verification.validate_user_config(user, headers).await;
        if !verdict.is_valid {
            return Err(UploadError::Validation(
                verdict
                    .error
                    .unwrap_or_else(|| "Validation failed".to_string()),
            ));
        }
        let student_id = match verdict.student_id {
            Some(id) => id,
            None => token::student_id(&user.token)?,
        };
        let client = self.connector.connect(headers, &user.token)?;
        pipeline.advance();

        let start_ref = client
            .upload_image(ImageKind::Start, start_image, IMAGE_FILENAME)
            .await?;
        pipeline.advance();

        let finish_ref = client
            .upload_image(ImageKind::Finish, finish_image, IMAGE_FILENAME)
            .await?;
        pipeline.advance();

        let start_record = build_start_record(route, &timestamp, &start_ref, &student_id);
        let record_id = client.submit_start_record(&start_record).await?;
        tracing::debug!(record_id = %record_id, "Start record accepted");
        pipeline.advance();

        let finish_record = build_finish_record(
            &start_record,
            track,
            &finish_ref,
            &record_id,
            RecordStatus::Finished,
        )?;
        if !client.submit_finish_record(&finish_record).await? {
            return Err(UploadError::Rejected(format!(
                "Finish record {} was not accepted",
                record_id
            )));
        }

        Ok(record_id)
    }
}
