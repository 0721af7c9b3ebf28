//! Represents upload sessions: parts of a multipart upload and the progress
//! events streamed back to the caller.

use serde::Serialize;

/// A single uploaded part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedPart {
    /// Part number (1-based).
    pub part_number: i32,

    /// ETag returned by the service for this part.
    pub e_tag: String,
}

/// One server-sent event of a tracked upload.
///
/// Zero or more `Progress` events are followed by exactly one terminal
/// `Complete` or `Error`.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UploadEvent {
    Progress {
        loaded: u64,
        total: u64,
        percentage: u8,
    },
    Complete {
        success: bool,
        message: String,
    },
    Error {
        success: bool,
        error: String,
    },
}

impl UploadEvent {
    pub fn progress(loaded: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((loaded.min(total) as f64 / total as f64) * 100.0).round() as u8
        };
        UploadEvent::Progress {
            loaded,
            total,
            percentage,
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        UploadEvent::Complete {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        UploadEvent::Error {
            success: false,
            error: error.into(),
        }
    }
}
