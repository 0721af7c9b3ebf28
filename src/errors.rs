use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

use crate::models::envelope::ApiResponse;

/// Category of a failed proxy operation, surfaced uniformly for every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AccessDenied,
    InvalidCredentials,
    Network,
    Unclassified,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorKind::Network => StatusCode::BAD_GATEWAY,
            ErrorKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not-found",
            ErrorKind::AccessDenied => "access-denied",
            ErrorKind::InvalidCredentials => "invalid-credentials",
            ErrorKind::Network => "network",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lightweight error carrying its category and the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific kind and message.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    /// Bad or missing input; never reaches the backing service.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }

    /// Shortcut for a missing-identifier validation error, e.g. `Bucket name is required`.
    pub fn required(what: &str) -> Self {
        Self::validation(format!("{what} is required"))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, msg)
    }

    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, msg)
    }

    /// Shortcut for anything the classifier does not recognise.
    pub fn unclassified(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unclassified, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.kind {
            ErrorKind::Validation | ErrorKind::NotFound => {
                tracing::warn!(kind = %self.kind, "{}", self.message)
            }
            _ => tracing::error!(kind = %self.kind, "{}", self.message),
        }

        let body = Json(ApiResponse::<()>::failure(self.message));
        (self.kind.status(), body).into_response()
    }
}
