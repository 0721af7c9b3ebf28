//! HTTP handlers, one module per proxied service.
//!
//! Handlers check their required identifiers first, then let [`AppState`]
//! validate the connection and hand out a service; nothing reaches the
//! emulator before both checks pass.
//!
//! [`AppState`]: crate::state::AppState

pub mod config_handlers;
pub mod health_handlers;
pub mod iam_handlers;
pub mod s3_handlers;
pub mod sns_handlers;
pub mod sqs_handlers;

use axum::{Json, extract::rejection::JsonRejection};

use crate::errors::AppError;

/// Trimmed value of a required identifier, or `<what> is required`.
pub(crate) fn required(value: Option<&str>, what: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::required(what)),
    }
}

/// Like [`required`] but keeps the value exactly as sent (object keys,
/// receipt handles, documents).
pub(crate) fn required_raw(value: Option<&str>, what: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(AppError::required(what)),
    }
}

/// Unwrap a JSON body, reporting a malformed one in the usual envelope.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}
