//! Represents an object (file) stored in a bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, pin::Pin};
use tokio::io::AsyncRead;

/// One stored item as reported by the storage listing operation.
///
/// The record carries metadata only, never the content bytes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Slash-delimited key, unique within the bucket and never empty.
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// Timestamp when the object was last modified.
    pub last_modified: DateTime<Utc>,

    /// Storage class (e.g. STANDARD), passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// Body of a fetched object together with the headers worth forwarding.
pub struct ObjectDownload {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub e_tag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub body: Pin<Box<dyn AsyncRead + Send>>,
}

impl fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("e_tag", &self.e_tag)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

/// Final path segment of a key, used as the download file name.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::file_name;

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("photos/2025/img.jpg"), "img.jpg");
        assert_eq!(file_name("readme"), "readme");
        assert_eq!(file_name("dir/"), "");
    }
}
