//! StorageService: bucket and object operations proxied to an S3 backend.
//!
//! Besides one-to-one calls it owns the composite workflows: the
//! bucket-deletion cascade, best-effort attribute reads and writes, and
//! uploads with progress reporting (single put below the part size, an S3
//! multipart upload above it).

use bytes::Bytes;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    errors::AppError,
    models::{
        bucket::{BucketAttributes, BucketAttributesUpdate, BucketSummary},
        multipart::{UploadEvent, UploadedPart},
        object::{ObjectDownload, ObjectRecord},
        tree::TreeNode,
    },
    services::{
        backend::{BackendResult, StorageBackend},
        tree_builder::build_tree,
    },
};

/// Size of each part of a multipart upload; smaller files use a single put.
pub const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;

/// Lifetime of presigned download URLs.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// A file received from the caller, buffered in memory.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn StorageBackend>,
}

impl StorageService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn list_buckets(&self) -> BackendResult<Vec<BucketSummary>> {
        self.backend.list_buckets().await
    }

    pub async fn create_bucket(&self, bucket: &str) -> BackendResult<()> {
        self.backend.create_bucket(bucket).await?;
        info!(bucket, "created bucket");
        Ok(())
    }

    /// Delete every object of the bucket, then the bucket itself.
    ///
    /// Objects are deleted one after another; a failed delete is recorded and
    /// the sequence continues. The bucket delete is always attempted, even
    /// when listing fails. Any failed object delete turns the whole call
    /// into an error naming the keys left behind.
    pub async fn delete_bucket_cascade(&self, bucket: &str) -> BackendResult<()> {
        let objects = match self.backend.list_objects(bucket).await {
            Ok(objects) => objects,
            Err(err) => {
                warn!(bucket, error = %err, "could not list objects before bucket delete");
                Vec::new()
            }
        };

        let mut failed: Vec<(String, AppError)> = Vec::new();
        for object in &objects {
            match self.backend.delete_object(bucket, &object.key).await {
                Ok(()) => debug!(bucket, key = %object.key, "deleted object"),
                Err(err) => {
                    warn!(bucket, key = %object.key, error = %err, "object delete failed, continuing");
                    failed.push((object.key.clone(), err));
                }
            }
        }

        let bucket_result = self.backend.delete_bucket(bucket).await;

        if let Some((_, first)) = failed.first() {
            if let Err(err) = &bucket_result {
                warn!(bucket, error = %err, "bucket delete failed after object failures");
            }
            let keys = failed
                .iter()
                .map(|(key, _)| format!("\"{key}\""))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::new(
                first.kind,
                format!(
                    "Failed to delete {} object(s) from bucket \"{bucket}\": {keys}",
                    failed.len()
                ),
            ));
        }

        bucket_result?;
        info!(bucket, objects = objects.len(), "deleted bucket");
        Ok(())
    }

    /// Read every bucket attribute; a failed read falls back to its default.
    pub async fn bucket_attributes(&self, bucket: &str) -> BucketAttributes {
        let mut attributes = BucketAttributes::default();

        match self.backend.get_bucket_versioning(bucket).await {
            Ok(Some(status)) => attributes.versioning = status,
            Ok(None) => {}
            Err(err) => debug!(bucket, error = %err, "versioning unavailable"),
        }
        match self.backend.get_bucket_encryption(bucket).await {
            Ok(encryption) => attributes.encryption = encryption,
            Err(err) => debug!(bucket, error = %err, "encryption unavailable"),
        }
        match self.backend.get_bucket_cors(bucket).await {
            Ok(cors) => attributes.cors = cors,
            Err(err) => debug!(bucket, error = %err, "cors unavailable"),
        }
        match self.backend.get_bucket_tagging(bucket).await {
            Ok(tags) => attributes.tags = tags,
            Err(err) => debug!(bucket, error = %err, "tagging unavailable"),
        }
        match self.backend.get_bucket_accelerate(bucket).await {
            Ok(Some(status)) => attributes.transfer_acceleration = status,
            Ok(None) => {}
            Err(err) => debug!(bucket, error = %err, "transfer acceleration unavailable"),
        }

        attributes
    }

    /// Apply each present attribute independently and describe the outcome
    /// of every one of them, in a fixed order.
    pub async fn update_bucket_attributes(
        &self,
        bucket: &str,
        update: &BucketAttributesUpdate,
    ) -> Vec<String> {
        let mut results = Vec::new();

        if let Some(status) = &update.versioning {
            results.push(outcome(
                bucket,
                "versioning",
                self.backend.put_bucket_versioning(bucket, status).await,
                "Versioning updated",
            ));
        }
        if let Some(encryption) = &update.encryption {
            let done = if encryption.enabled {
                "Encryption enabled"
            } else {
                "Encryption disabled"
            };
            results.push(outcome(
                bucket,
                "encryption",
                self.backend.put_bucket_encryption(bucket, encryption).await,
                done,
            ));
        }
        if let Some(cors) = &update.cors {
            results.push(outcome(
                bucket,
                "CORS",
                self.backend.put_bucket_cors(bucket, cors).await,
                "CORS configuration updated",
            ));
        }
        if let Some(tags) = &update.tags {
            results.push(outcome(
                bucket,
                "tags",
                self.backend.put_bucket_tagging(bucket, tags).await,
                "Tags updated",
            ));
        }
        if let Some(status) = &update.transfer_acceleration {
            results.push(outcome(
                bucket,
                "transfer acceleration",
                self.backend.put_bucket_accelerate(bucket, status).await,
                "Transfer acceleration updated",
            ));
        }

        results
    }

    pub async fn list_objects(&self, bucket: &str) -> BackendResult<Vec<ObjectRecord>> {
        self.backend.list_objects(bucket).await
    }

    /// List the bucket and fold the keys into a folder tree.
    /// Returns the number of listed objects alongside the forest.
    pub async fn object_tree(&self, bucket: &str) -> BackendResult<(usize, Vec<TreeNode>)> {
        let records = self.backend.list_objects(bucket).await?;
        let count = records.len();
        Ok((count, build_tree(records)))
    }

    pub async fn put_object(&self, bucket: &str, key: &str, file: UploadFile) -> BackendResult<()> {
        let size = file.body.len();
        self.backend
            .put_object(bucket, key, file.content_type, file.body)
            .await?;
        info!(bucket, key, size, "uploaded object");
        Ok(())
    }

    pub async fn download(&self, bucket: &str, key: &str) -> BackendResult<ObjectDownload> {
        self.backend.get_object(bucket, key).await
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.backend.delete_object(bucket, key).await?;
        info!(bucket, key, "deleted object");
        Ok(())
    }

    pub async fn presigned_download_url(&self, bucket: &str, key: &str) -> BackendResult<String> {
        self.backend
            .presign_get_object(bucket, key, PRESIGNED_URL_TTL)
            .await
    }

    /// Upload `file` while reporting progress on `events`.
    ///
    /// Sends zero or more progress events and then exactly one terminal
    /// event. When the receiver goes away the upload stops at the next
    /// progress report and a started multipart upload is aborted.
    pub async fn upload_with_progress(
        &self,
        bucket: &str,
        key: &str,
        file: UploadFile,
        events: mpsc::Sender<UploadEvent>,
    ) {
        let file_name = file.file_name.clone();
        let total = file.body.len() as u64;

        let result = if file.body.len() > MULTIPART_PART_SIZE {
            self.multipart_upload(bucket, key, file, &events).await
        } else {
            match self.put_object(bucket, key, file).await {
                Ok(()) => report(&events, UploadEvent::progress(total, total)).await,
                Err(err) => Err(err),
            }
        };

        let terminal = match result {
            Ok(()) => UploadEvent::complete(format!("Successfully uploaded \"{file_name}\" to {bucket}")),
            Err(err) => {
                warn!(bucket, key, error = %err, "tracked upload failed");
                UploadEvent::error(err.message)
            }
        };
        if events.send(terminal).await.is_err() {
            debug!(bucket, key, "upload listener went away before completion");
        }
    }

    async fn multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        file: UploadFile,
        events: &mpsc::Sender<UploadEvent>,
    ) -> BackendResult<()> {
        let upload_id = self
            .backend
            .create_multipart_upload(bucket, key, file.content_type)
            .await?;
        debug!(bucket, key, %upload_id, "started multipart upload");

        let uploaded = async {
            let parts = self
                .upload_parts(bucket, key, &upload_id, &file.body, events)
                .await?;
            self.backend
                .complete_multipart_upload(bucket, key, &upload_id, parts)
                .await
        }
        .await;

        match uploaded {
            Ok(()) => {
                info!(bucket, key, size = file.body.len(), "completed multipart upload");
                Ok(())
            }
            Err(err) => {
                if let Err(abort_err) = self
                    .backend
                    .abort_multipart_upload(bucket, key, &upload_id)
                    .await
                {
                    warn!(bucket, key, %upload_id, error = %abort_err, "abort of multipart upload failed");
                }
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        body: &Bytes,
        events: &mpsc::Sender<UploadEvent>,
    ) -> BackendResult<Vec<UploadedPart>> {
        let total = body.len() as u64;
        let mut parts = Vec::new();
        let mut offset = 0;
        let mut part_number = 1;

        while offset < body.len() {
            let end = (offset + MULTIPART_PART_SIZE).min(body.len());
            let part = self
                .backend
                .upload_part(bucket, key, upload_id, part_number, body.slice(offset..end))
                .await?;
            parts.push(part);
            offset = end;
            part_number += 1;
            report(events, UploadEvent::progress(offset as u64, total)).await?;
        }

        Ok(parts)
    }
}

async fn report(events: &mpsc::Sender<UploadEvent>, event: UploadEvent) -> BackendResult<()> {
    events
        .send(event)
        .await
        .map_err(|_| AppError::unclassified("Upload cancelled: client disconnected"))
}

fn outcome(bucket: &str, attribute: &str, result: BackendResult<()>, done: &str) -> String {
    match result {
        Ok(()) => done.to_string(),
        Err(err) => {
            warn!(bucket, attribute, error = %err, "attribute update failed");
            format!("Failed to update {attribute}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::multipart::UploadEvent;

    #[test]
    fn part_size_is_eight_mebibytes() {
        assert_eq!(MULTIPART_PART_SIZE, 8_388_608);
    }

    #[test]
    fn outcome_names_the_failed_attribute() {
        assert_eq!(outcome("b", "tags", Ok(()), "Tags updated"), "Tags updated");
        assert_eq!(
            outcome("b", "CORS", Err(AppError::unclassified("boom")), "CORS configuration updated"),
            "Failed to update CORS"
        );
    }

    #[tokio::test]
    async fn report_fails_once_listener_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = report(&tx, UploadEvent::progress(1, 2)).await.unwrap_err();
        assert!(err.message.contains("disconnected"));
    }
}
