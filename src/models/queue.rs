//! Queues and the messages read from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One queue of the listing, with whatever detail could be read for it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub queue_url: String,

    /// Last segment of the queue URL.
    pub queue_name: String,

    /// Absent when the attributes could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,

    /// Absent when the tags could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl QueueSummary {
    pub fn bare(queue_url: impl Into<String>) -> Self {
        let queue_url = queue_url.into();
        Self {
            queue_name: queue_name_from_url(&queue_url).to_string(),
            queue_url,
            attributes: None,
            tags: None,
        }
    }
}

/// Typed message attribute, shared by queue messages and topic publishes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttribute {
    #[serde(alias = "DataType")]
    pub data_type: String,
    #[serde(default, alias = "StringValue", skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

/// A received queue message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_of_body: Option<String>,
    /// System attributes such as `SentTimestamp`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub message_attributes: BTreeMap<String, MessageAttribute>,
}

/// Identifier returned after a send.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub message_id: String,
}

/// Queue name as the last path segment of its URL; the URL itself when it has none.
pub fn queue_name_from_url(queue_url: &str) -> &str {
    match queue_url.trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => queue_url,
    }
}
