//! Classification of SDK failures into the console's error kinds.

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::{display::DisplayErrorContext, metadata::ProvideErrorMetadata};
use std::fmt;

use crate::errors::AppError;

pub const NETWORK_MESSAGE: &str = "Network error - check your endpoint";

/// Map a service error code to a known kind; `None` for anything unrecognised.
pub fn classify_code(code: Option<&str>, message: Option<&str>) -> Option<AppError> {
    let err = match code? {
        "NoSuchBucket" => AppError::not_found("Bucket not found"),
        "NoSuchKey" => AppError::not_found("Object not found"),
        "NotFound"
        | "NoSuchEntity"
        | "NoSuchUpload"
        | "QueueDoesNotExist"
        | "AWS.SimpleQueueService.NonExistentQueue"
        | "ResourceNotFoundException" => {
            AppError::not_found(message.unwrap_or("Resource not found"))
        }
        "AccessDenied" | "AccessDeniedException" | "AuthorizationError" => {
            AppError::access_denied("Access denied")
        }
        "InvalidAccessKeyId" => AppError::invalid_credentials("Invalid access key"),
        "SignatureDoesNotMatch" | "InvalidClientTokenId" | "UnrecognizedClientException" => {
            AppError::invalid_credentials("Invalid credentials")
        }
        _ => return None,
    };
    Some(err)
}

/// Classify a failed SDK call.
///
/// Transport failures (connection refused, DNS, timeouts) become `network`;
/// service errors are matched on their declared code; everything else is
/// `unclassified` and keeps the service's own message.
pub fn classify<E, R>(err: SdkError<E, R>) -> AppError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    if matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    ) {
        tracing::debug!("transport failure: {}", DisplayErrorContext(&err));
        return AppError::network(NETWORK_MESSAGE);
    }

    if let Some(classified) = classify_code(err.code(), err.message()) {
        tracing::debug!(code = ?err.code(), "service error: {}", DisplayErrorContext(&err));
        return classified;
    }

    let message = match err.message() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };
    AppError::unclassified(message)
}

/// A request that could not be assembled from the caller's input.
pub fn invalid_input(err: impl fmt::Display) -> AppError {
    AppError::validation(err.to_string())
}
