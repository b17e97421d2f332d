// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential and tenant checks that gate every upload.
//!
//! Local fields are checked before anything touches the network, so a
//! half-filled form never costs a (paced) remote call.

use std::sync::Arc;

use crate::error::UploadError;
use crate::models::{RequestHeaders, User, VerificationResult};
use crate::services::exercise_api::Connector;
use crate::services::token::{self, Claims};

/// Call-scoped verification against the exercise service. Holds no state
/// between calls.
#[derive(Clone)]
pub struct VerificationService {
    connector: Arc<dyn Connector>,
}

impl VerificationService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Ask the service whether the token is live, then decode its claims.
    pub async fn verify_token(&self, token: &str, headers: &RequestHeaders) -> VerificationResult {
        match self.check_token(token, headers).await {
            Ok(claims) => VerificationResult::verified(claims),
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed");
                VerificationResult::failed(e.to_string())
            }
        }
    }

    async fn check_token(
        &self,
        token: &str,
        headers: &RequestHeaders,
    ) -> Result<Claims, UploadError> {
        let client = self.connector.connect(headers, token)?;
        client.check_token().await?;
        Ok(token::decode(token)?)
    }

    /// Ask the service whether the tenant code is known.
    pub async fn verify_tenant(
        &self,
        tenant: &str,
        headers: &RequestHeaders,
        token: &str,
    ) -> VerificationResult {
        let outcome = match self.connector.connect(headers, token) {
            Ok(client) => client.check_tenant(tenant).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => VerificationResult::passed(),
            Err(e) => {
                tracing::warn!(tenant, error = %e, "Tenant verification failed");
                VerificationResult::failed(e.to_string())
            }
        }
    }

    /// Check everything an upload needs, in order, stopping at the first gap:
    /// token, route, start photo, finish photo, then the remote token and
    /// tenant checks.
    pub async fn validate_user_config(
        &self,
        user: &User,
        headers: &RequestHeaders,
    ) -> VerificationResult {
        if let Err(missing) = check_required_fields(user) {
            tracing::info!(error = %missing, "Upload settings incomplete");
            return VerificationResult::failed(missing.to_string());
        }

        self.verify_identity(&user.token, headers).await
    }

    /// Lightweight check used before the rest of the form is filled in:
    /// token present, then the remote token and tenant checks.
    pub async fn validate_token_only(
        &self,
        token: &str,
        headers: &RequestHeaders,
    ) -> VerificationResult {
        if is_blank(token) {
            return VerificationResult::failed(TOKEN_REQUIRED);
        }

        self.verify_identity(token, headers).await
    }

    async fn verify_identity(&self, token: &str, headers: &RequestHeaders) -> VerificationResult {
        let token_result = self.verify_token(token, headers).await;
        if !token_result.is_valid {
            return token_result;
        }

        let tenant_result = self.verify_tenant(&headers.tenant, headers, token).await;
        if !tenant_result.is_valid {
            return tenant_result;
        }

        tracing::info!("Identity verified");
        token_result
    }
}

const TOKEN_REQUIRED: &str = "Token is required";

/// Local required-field checks, in the order they are reported.
pub fn check_required_fields(user: &User) -> Result<(), UploadError> {
    let required = [
        (user.token.as_str(), TOKEN_REQUIRED),
        (user.route.as_str(), "Route selection is required"),
        (user.start_image.as_str(), "Start image is required"),
        (user.finish_image.as_str(), "Finish image is required"),
    ];

    match required.iter().find(|(value, _)| is_blank(value)) {
        Some((_, message)) => Err(UploadError::Validation(message.to_string())),
        None => Ok(()),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
