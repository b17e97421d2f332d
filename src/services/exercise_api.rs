// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise service API client.
//!
//! Handles:
//! - Token and tenant checks
//! - Start/finish photo uploads (multipart)
//! - Start and finish record submission
//! - Randomized pacing before every request
//! - Response envelope checking (`{code, msg, data}`, non-zero code = failure)

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::UploadError;
use crate::models::{FinishRecord, RequestHeaders, StartRecord};

/// Production base URL of the exercise service.
pub const API_BASE_URL: &str = "https://tyxsjpt.seu.edu.cn";

/// File name every uploaded photo is sent under.
pub const IMAGE_FILENAME: &str = "1.jpg";

const IMAGE_MIME_TYPE: &str = "image/jpeg";
const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";
const TOKEN_PREFIX: &str = "Bearer ";

/// Endpoint paths, relative to the base URL.
pub mod paths {
    pub const CHECK_TENANT: &str = "/api/miniapp/anno/checkTenant";
    pub const CHECK_TOKEN: &str = "/api/miniapp/student/checkToken";
    pub const SAVE_START_RECORD: &str = "/api/exercise/exerciseRecord/saveStartRecord";
    pub const SAVE_RECORD: &str = "/api/exercise/exerciseRecord/saveRecord";
    pub const UPLOAD_START_IMAGE: &str = "/api/miniapp/exercise/uploadRecordImage";
    pub const UPLOAD_FINISH_IMAGE: &str = "/api/miniapp/exercise/uploadRecordImage2";
}

/// Which of the two proof photos is being uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Start,
    Finish,
}

impl ImageKind {
    fn path(self) -> &'static str {
        match self {
            ImageKind::Start => paths::UPLOAD_START_IMAGE,
            ImageKind::Finish => paths::UPLOAD_FINISH_IMAGE,
        }
    }
}

/// Operations the upload pipeline needs from the exercise service.
///
/// An implementation is scoped to a single token and header set.
#[async_trait::async_trait]
pub trait ExerciseApi: Send + Sync {
    /// Fails if the token is invalid or expired.
    async fn check_token(&self) -> Result<(), UploadError>;

    /// Fails if the tenant code is not recognized.
    async fn check_tenant(&self, tenant: &str) -> Result<(), UploadError>;

    /// Upload a photo and return the service's reference to it.
    async fn upload_image(
        &self,
        kind: ImageKind,
        bytes: &[u8],
        filename: &str,
    ) -> Result<String, UploadError>;

    /// Submit the start record and return the identifier the service assigned.
    async fn submit_start_record(&self, record: &StartRecord) -> Result<String, UploadError>;

    /// Submit the finish record; `Ok(false)` means the service declined it.
    async fn submit_finish_record(&self, record: &FinishRecord) -> Result<bool, UploadError>;
}

/// Creates token-scoped API clients.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        headers: &RequestHeaders,
        token: &str,
    ) -> Result<Arc<dyn ExerciseApi>, UploadError>;
}

/// Uniformly random delay applied before every outbound request.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Pick the delay for the next request.
    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Pacing request");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builds `ExerciseClient`s that share one connection pool.
#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    base_url: String,
    pacing: Pacing,
}

impl HttpConnector {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| UploadError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            pacing: Pacing::new(config.request_min_delay, config.request_max_delay),
        })
    }
}

impl Connector for HttpConnector {
    fn connect(
        &self,
        headers: &RequestHeaders,
        token: &str,
    ) -> Result<Arc<dyn ExerciseApi>, UploadError> {
        let client = ExerciseClient::new(
            self.http.clone(),
            self.base_url.clone(),
            self.pacing,
            headers,
            token,
        )?;
        Ok(Arc::new(client))
    }
}

/// Exercise service client for one token.
#[derive(Clone)]
pub struct ExerciseClient {
    http: reqwest::Client,
    base_url: String,
    pacing: Pacing,
    /// Headers sent with every request
    common_headers: HeaderMap,
    token: HeaderValue,
    tenant: HeaderValue,
}

impl ExerciseClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        pacing: Pacing,
        headers: &RequestHeaders,
        token: &str,
    ) -> Result<Self, UploadError> {
        let mut common_headers = HeaderMap::new();
        let fixed: [(&'static str, &str); 9] = [
            ("miniappversion", headers.miniapp_version.as_str()),
            ("user-agent", headers.user_agent.as_str()),
            ("referer", headers.referer.as_str()),
            ("xweb_xhr", "1"),
            ("accept", "*/*"),
            ("sec-fetch-site", "cross-site"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-dest", "empty"),
            ("accept-language", "zh-CN,zh;q=0.9"),
        ];
        for (name, value) in fixed {
            common_headers.insert(HeaderName::from_static(name), header_value(name, value)?);
        }

        Ok(Self {
            http,
            base_url,
            pacing,
            common_headers,
            token: header_value("token", &format!("{}{}", TOKEN_PREFIX, token.trim()))?,
            tenant: header_value("tenant", &headers.tenant)?,
        })
    }

    /// Headers for calls made on behalf of the user.
    fn user_headers(&self) -> HeaderMap {
        let mut headers = self.common_headers.clone();
        headers.insert("token", self.token.clone());
        headers.insert("tenant", self.tenant.clone());
        headers
    }

    /// Send a request and unwrap the response envelope, returning `data`.
    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, UploadError> {
        self.pacing.wait().await;

        tracing::debug!(path, "Calling exercise service");
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                UploadError::Transport(format!("Request to {} timed out", path))
            } else {
                UploadError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path, status = %status, "Exercise service HTTP error");
            return Err(UploadError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| UploadError::Transport(format!("JSON parse error: {}", e)))?;

        if envelope.code != 0 {
            tracing::warn!(
                path,
                code = envelope.code,
                msg = %envelope.msg,
                "Exercise service rejected request"
            );
            return Err(UploadError::Remote {
                code: envelope.code,
                message: envelope.msg,
            });
        }

        Ok(envelope.data)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl ExerciseApi for ExerciseClient {
    async fn check_token(&self) -> Result<(), UploadError> {
        let request = self
            .http
            .get(self.url(paths::CHECK_TOKEN))
            .headers(self.user_headers())
            .header(CONTENT_TYPE, "application/json")
            .query(&[("para", "undefined")]);

        self.send(paths::CHECK_TOKEN, request).await?;
        Ok(())
    }

    async fn check_tenant(&self, tenant: &str) -> Result<(), UploadError> {
        // Anonymous endpoint: sent without the token and tenant headers.
        let request = self
            .http
            .post(self.url(paths::CHECK_TENANT))
            .headers(self.common_headers.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .query(&[("tenantCode", tenant)])
            .body("{}");

        self.send(paths::CHECK_TENANT, request).await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        kind: ImageKind,
        bytes: &[u8],
        filename: &str,
    ) -> Result<String, UploadError> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(IMAGE_MIME_TYPE)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .post(self.url(kind.path()))
            .headers(self.user_headers())
            .multipart(form);

        let data = self.send(kind.path(), request).await?;
        expect_text(data, "image reference")
    }

    async fn submit_start_record(&self, record: &StartRecord) -> Result<String, UploadError> {
        let body = serde_json::to_vec(record)
            .map_err(|e| UploadError::Transport(format!("Failed to encode start record: {}", e)))?;

        let request = self
            .http
            .post(self.url(paths::SAVE_START_RECORD))
            .headers(self.user_headers())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body);

        let data = self.send(paths::SAVE_START_RECORD, request).await?;
        expect_text(data, "record identifier")
    }

    async fn submit_finish_record(&self, record: &FinishRecord) -> Result<bool, UploadError> {
        let body = serde_json::to_vec(record).map_err(|e| {
            UploadError::Transport(format!("Failed to encode finish record: {}", e))
        })?;

        let request = self
            .http
            .post(self.url(paths::SAVE_RECORD))
            .headers(self.user_headers())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body);

        match self.send(paths::SAVE_RECORD, request).await? {
            Value::Bool(accepted) => Ok(accepted),
            // Some deployments answer with no data at all on success.
            Value::Null => Ok(true),
            other => Err(UploadError::Transport(format!(
                "Unexpected finish record response: {}",
                other
            ))),
        }
    }
}

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, UploadError> {
    HeaderValue::from_str(value)
        .map_err(|_| UploadError::Validation(format!("Invalid characters in {} header", name)))
}

/// Read a string-ish `data` payload (identifiers may arrive as numbers).
fn expect_text(data: Value, what: &str) -> Result<String, UploadError> {
    match data {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(UploadError::Transport(format!(
            "Response carried no {}: {}",
            what, other
        ))),
    }
}
