//! Buckets as seen through the console: summaries and their configurable attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// One entry of the bucket listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    /// Bucket name (unique per emulator).
    pub name: String,

    /// When the bucket was created; Unix epoch when the service omits it.
    pub creation_date: DateTime<Utc>,
}

/// Default server-side encryption of a bucket.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionSettings {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// A CORS rule, in the member naming the S3 API itself uses.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CorsRule {
    #[serde(default, rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<i32>,
}

/// Snapshot of the readable bucket configuration.
///
/// Every member is read independently; one that cannot be read holds its
/// default (`Suspended`, disabled encryption, no rules, no tags).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BucketAttributes {
    pub versioning: String,
    pub encryption: EncryptionSettings,
    pub cors: Vec<CorsRule>,
    pub tags: Vec<Tag>,
    pub transfer_acceleration: String,
}

impl Default for BucketAttributes {
    fn default() -> Self {
        Self {
            versioning: "Suspended".into(),
            encryption: EncryptionSettings::default(),
            cors: Vec::new(),
            tags: Vec::new(),
            transfer_acceleration: "Suspended".into(),
        }
    }
}

/// Requested attribute changes; absent members are left untouched.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BucketAttributesUpdate {
    pub versioning: Option<String>,
    pub encryption: Option<EncryptionSettings>,
    pub cors: Option<Vec<CorsRule>>,
    pub tags: Option<Vec<Tag>>,
    pub transfer_acceleration: Option<String>,
}

impl BucketAttributesUpdate {
    pub fn is_empty(&self) -> bool {
        self.versioning.is_none()
            && self.encryption.is_none()
            && self.cors.is_none()
            && self.tags.is_none()
            && self.transfer_acceleration.is_none()
    }
}
