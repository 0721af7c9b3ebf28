//! Seams between the proxy services and the emulator.
//!
//! Each trait covers one backing service. A [`BackendFactory`] turns the
//! per-request [`ConnectionParameters`] into short-lived clients; the SDK
//! implementation lives in `services::aws`. Every method is one call against
//! the emulator and reports failures already classified as [`AppError`].

use async_trait::async_trait;
use bytes::Bytes;
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use crate::{
    errors::AppError,
    models::{
        bucket::{BucketSummary, CorsRule, EncryptionSettings},
        connection::ConnectionParameters,
        identity::{IamPolicy, IamRole, IamUser},
        multipart::UploadedPart,
        object::{ObjectDownload, ObjectRecord},
        queue::{MessageAttribute, QueueMessage},
        tag::Tag,
        topic::Subscription,
    },
};

pub type BackendResult<T> = Result<T, AppError>;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn list_buckets(&self) -> BackendResult<Vec<BucketSummary>>;
    async fn create_bucket(&self, bucket: &str) -> BackendResult<()>;
    async fn delete_bucket(&self, bucket: &str) -> BackendResult<()>;

    /// Every object of the bucket, across all listing pages.
    async fn list_objects(&self, bucket: &str) -> BackendResult<Vec<ObjectRecord>>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> BackendResult<()>;
    async fn get_object(&self, bucket: &str, key: &str) -> BackendResult<ObjectDownload>;
    async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()>;
    async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> BackendResult<String>;

    /// Starts a multipart upload and returns its upload id.
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
    ) -> BackendResult<String>;
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> BackendResult<UploadedPart>;
    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> BackendResult<()>;
    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> BackendResult<()>;

    /// `None` when versioning was never configured.
    async fn get_bucket_versioning(&self, bucket: &str) -> BackendResult<Option<String>>;
    async fn put_bucket_versioning(&self, bucket: &str, status: &str) -> BackendResult<()>;
    async fn get_bucket_encryption(&self, bucket: &str) -> BackendResult<EncryptionSettings>;
    async fn put_bucket_encryption(
        &self,
        bucket: &str,
        settings: &EncryptionSettings,
    ) -> BackendResult<()>;
    async fn get_bucket_cors(&self, bucket: &str) -> BackendResult<Vec<CorsRule>>;
    async fn put_bucket_cors(&self, bucket: &str, rules: &[CorsRule]) -> BackendResult<()>;
    async fn get_bucket_tagging(&self, bucket: &str) -> BackendResult<Vec<Tag>>;
    async fn put_bucket_tagging(&self, bucket: &str, tags: &[Tag]) -> BackendResult<()>;
    async fn get_bucket_accelerate(&self, bucket: &str) -> BackendResult<Option<String>>;
    async fn put_bucket_accelerate(&self, bucket: &str, status: &str) -> BackendResult<()>;
}

#[async_trait]
pub trait QueueBackend: Send + Sync {
    async fn list_queues(&self) -> BackendResult<Vec<String>>;
    async fn get_queue_attributes(&self, queue_url: &str)
    -> BackendResult<BTreeMap<String, String>>;
    async fn list_queue_tags(&self, queue_url: &str) -> BackendResult<BTreeMap<String, String>>;
    /// Returns the new queue's URL.
    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<String>;
    async fn delete_queue(&self, queue_url: &str) -> BackendResult<()>;
    async fn purge_queue(&self, queue_url: &str) -> BackendResult<()>;
    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<()>;
    /// Returns the message id.
    async fn send_message(&self, queue_url: &str, body: &str) -> BackendResult<String>;
    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> BackendResult<Vec<QueueMessage>>;
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> BackendResult<()>;
}

#[async_trait]
pub trait TopicBackend: Send + Sync {
    /// Every topic ARN, across all listing pages.
    async fn list_topics(&self) -> BackendResult<Vec<String>>;
    /// Returns the topic ARN.
    async fn create_topic(&self, name: &str) -> BackendResult<String>;
    async fn delete_topic(&self, topic_arn: &str) -> BackendResult<()>;
    async fn get_topic_attributes(&self, topic_arn: &str)
    -> BackendResult<BTreeMap<String, String>>;
    async fn set_topic_attribute(
        &self,
        topic_arn: &str,
        name: &str,
        value: &str,
    ) -> BackendResult<()>;
    async fn list_tags(&self, resource_arn: &str) -> BackendResult<Vec<Tag>>;
    async fn tag_resource(&self, resource_arn: &str, tags: &[Tag]) -> BackendResult<()>;
    async fn untag_resource(&self, resource_arn: &str, keys: &[String]) -> BackendResult<()>;
    async fn list_subscriptions(&self, topic_arn: &str) -> BackendResult<Vec<Subscription>>;
    /// Returns the subscription ARN when the service reports one.
    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> BackendResult<Option<String>>;
    async fn unsubscribe(&self, subscription_arn: &str) -> BackendResult<()>;
    async fn get_subscription_attributes(
        &self,
        subscription_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>>;
    async fn set_subscription_attribute(
        &self,
        subscription_arn: &str,
        name: &str,
        value: &str,
    ) -> BackendResult<()>;
    /// Returns the message id when the service reports one.
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
        attributes: &BTreeMap<String, MessageAttribute>,
    ) -> BackendResult<Option<String>>;
}

#[async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn list_users(&self) -> BackendResult<Vec<IamUser>>;
    async fn create_user(&self, user_name: &str) -> BackendResult<Option<IamUser>>;
    async fn delete_user(&self, user_name: &str) -> BackendResult<()>;
    async fn list_roles(&self) -> BackendResult<Vec<IamRole>>;
    async fn create_role(
        &self,
        role_name: &str,
        assume_role_policy_document: &str,
        description: Option<&str>,
    ) -> BackendResult<Option<IamRole>>;
    async fn delete_role(&self, role_name: &str) -> BackendResult<()>;
    /// Customer-managed policies only.
    async fn list_policies(&self) -> BackendResult<Vec<IamPolicy>>;
    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &str,
    ) -> BackendResult<Option<IamPolicy>>;
    async fn delete_policy(&self, policy_arn: &str) -> BackendResult<()>;
}

/// Builds one client per request from its connection parameters.
///
/// Implementations must not pool clients implicitly; parameters are validated
/// by the caller before any method here is invoked.
pub trait BackendFactory: Send + Sync {
    fn storage(&self, conn: &ConnectionParameters) -> Arc<dyn StorageBackend>;
    fn queues(&self, conn: &ConnectionParameters) -> Arc<dyn QueueBackend>;
    fn topics(&self, conn: &ConnectionParameters) -> Arc<dyn TopicBackend>;
    fn identity(&self, conn: &ConnectionParameters) -> Arc<dyn IdentityBackend>;
}
