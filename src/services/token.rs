// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Claims extraction from the service's three-part credential.
//!
//! The signature is never checked here. Decoding only tells us who the
//! token claims to belong to; whether the service still honours it is
//! decided by the remote `checkToken` call.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde_json::{Map, Value};

/// Number of dot-separated segments in a well-formed token.
pub const TOKEN_PARTS_COUNT: usize = 3;

/// Payload field holding the student identifier.
pub const TOKEN_USERID_FIELD: &str = "userid";

/// Identity claims carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub student_id: String,
    pub name: Option<String>,
    pub account: Option<String>,
}

/// Errors from token decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token must contain 3 parts (format: part1.part2.part3)")]
    MalformedToken,

    #[error("Failed to decode token payload: {0}")]
    MalformedPayload(String),

    #[error("Token does not contain userid field")]
    MissingIdentity,
}

/// Decode the claims from a token without verifying its signature.
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != TOKEN_PARTS_COUNT || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::MalformedToken);
    }

    let payload = decode_payload(segments[1])?;

    let student_id = match payload.get(TOKEN_USERID_FIELD) {
        None | Some(Value::Null) => return Err(TokenError::MissingIdentity),
        Some(value) => claim_text(value).ok_or_else(|| {
            TokenError::MalformedPayload("userid must be a string or number".to_string())
        })?,
    };

    Ok(Claims {
        student_id,
        name: payload.get("name").and_then(claim_text),
        account: payload.get("account").and_then(claim_text),
    })
}

/// Convenience accessor for the student identifier.
pub fn student_id(token: &str) -> Result<String, TokenError> {
    decode(token).map(|claims| claims.student_id)
}

/// Base64url-decode the middle segment into a JSON object.
fn decode_payload(segment: &str) -> Result<Map<String, Value>, TokenError> {
    let padding = (4 - segment.len() % 4) % 4;
    let padded = format!("{}{}", segment, "=".repeat(padding));

    let bytes = URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| TokenError::MalformedPayload(e.to_string()))?;
    let text =
        std::str::from_utf8(&bytes).map_err(|e| TokenError::MalformedPayload(e.to_string()))?;

    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TokenError::MalformedPayload(
            "payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(TokenError::MalformedPayload(e.to_string())),
    }
}

fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
