use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{
        AccelerateConfiguration, BucketAccelerateStatus, BucketLocationConstraint,
        BucketVersioningStatus, CompletedMultipartUpload, CompletedPart, CorsConfiguration,
        CorsRule as S3CorsRule, CreateBucketConfiguration, Object, ServerSideEncryption,
        ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
        ServerSideEncryptionRule, Tag as S3Tag, Tagging, VersioningConfiguration,
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;

use super::{
    error::{classify, invalid_input},
    timestamp,
};
use crate::{
    errors::AppError,
    models::{
        bucket::{BucketSummary, CorsRule, EncryptionSettings},
        multipart::UploadedPart,
        object::{ObjectDownload, ObjectRecord},
        tag::Tag,
    },
    services::backend::{BackendResult, StorageBackend},
};

/// Region that must not be sent as a location constraint.
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ALGORITHM: &str = "AES256";

pub struct S3Backend {
    client: Client,
    region: String,
}

impl S3Backend {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

fn object_record(object: &Object) -> Option<ObjectRecord> {
    let key = object.key().filter(|k| !k.is_empty())?;
    Some(ObjectRecord {
        key: key.to_string(),
        size: object.size().map_or(0, |n| u64::try_from(n).unwrap_or(0)),
        last_modified: object
            .last_modified()
            .and_then(timestamp)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        storage_class: object.storage_class().map(|c| c.as_str().to_string()),
    })
}

fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(md5::compute(body).0)
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn list_buckets(&self) -> BackendResult<Vec<BucketSummary>> {
        let output = self.client.list_buckets().send().await.map_err(classify)?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name().filter(|n| !n.is_empty())?;
                Some(BucketSummary {
                    name: name.to_string(),
                    creation_date: bucket
                        .creation_date()
                        .and_then(timestamp)
                        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                })
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> BackendResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if !self.region.is_empty() && self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request.send().await.map_err(classify)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> BackendResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> BackendResult<Vec<ObjectRecord>> {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(classify)?;
            records.extend(output.contents().iter().filter_map(object_record));
            match output.next_continuation_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(records)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        body: Bytes,
    ) -> BackendResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type)
            .content_md5(content_md5(&body))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> BackendResult<ObjectDownload> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        Ok(ObjectDownload {
            content_type: output.content_type().map(str::to_string),
            content_length: output
                .content_length()
                .and_then(|n| u64::try_from(n).ok()),
            e_tag: output.e_tag().map(str::to_string),
            last_modified: output.last_modified().and_then(timestamp),
            body: Box::pin(output.body.into_async_read()),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> BackendResult<String> {
        let config = PresigningConfig::expires_in(expires_in).map_err(invalid_input)?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(classify)?;
        Ok(request.uri().to_string())
    }

    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
    ) -> BackendResult<String> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(classify)?;
        output
            .upload_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::unclassified("Multipart upload was not assigned an upload id"))
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> BackendResult<UploadedPart> {
        let output = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(classify)?;
        Ok(UploadedPart {
            part_number,
            e_tag: output.e_tag().unwrap_or_default().to_string(),
        })
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> BackendResult<()> {
        let parts = parts
            .into_iter()
            .map(|part| {
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .e_tag(part.e_tag)
                    .build()
            })
            .collect::<Vec<_>>();
        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> BackendResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &str) -> BackendResult<Option<String>> {
        let output = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.status().map(|s| s.as_str().to_string()))
    }

    async fn put_bucket_versioning(&self, bucket: &str, status: &str) -> BackendResult<()> {
        self.client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::from(status))
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_bucket_encryption(&self, bucket: &str) -> BackendResult<EncryptionSettings> {
        let output = self
            .client
            .get_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        let by_default = output
            .server_side_encryption_configuration()
            .and_then(|config| config.rules().first())
            .and_then(|rule| rule.apply_server_side_encryption_by_default());
        Ok(match by_default {
            Some(rule) => EncryptionSettings {
                enabled: true,
                algorithm: Some(rule.sse_algorithm().as_str().to_string()),
                kms_key_id: rule.kms_master_key_id().map(str::to_string),
            },
            None => EncryptionSettings::default(),
        })
    }

    async fn put_bucket_encryption(
        &self,
        bucket: &str,
        settings: &EncryptionSettings,
    ) -> BackendResult<()> {
        if !settings.enabled {
            self.client
                .delete_bucket_encryption()
                .bucket(bucket)
                .send()
                .await
                .map_err(classify)?;
            return Ok(());
        }

        let algorithm = settings.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM);
        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::from(algorithm))
            .set_kms_master_key_id(settings.kms_key_id.clone())
            .build()
            .map_err(invalid_input)?;
        let config = ServerSideEncryptionConfiguration::builder()
            .rules(
                ServerSideEncryptionRule::builder()
                    .apply_server_side_encryption_by_default(by_default)
                    .build(),
            )
            .build()
            .map_err(invalid_input)?;
        self.client
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(config)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_bucket_cors(&self, bucket: &str) -> BackendResult<Vec<CorsRule>> {
        let output = self
            .client
            .get_bucket_cors()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        Ok(output
            .cors_rules()
            .iter()
            .map(|rule| CorsRule {
                id: rule.id().map(str::to_string),
                allowed_headers: rule.allowed_headers().to_vec(),
                allowed_methods: rule.allowed_methods().to_vec(),
                allowed_origins: rule.allowed_origins().to_vec(),
                expose_headers: rule.expose_headers().to_vec(),
                max_age_seconds: rule.max_age_seconds(),
            })
            .collect())
    }

    async fn put_bucket_cors(&self, bucket: &str, rules: &[CorsRule]) -> BackendResult<()> {
        // An empty rule set cannot be stored; clearing means deleting it.
        if rules.is_empty() {
            self.client
                .delete_bucket_cors()
                .bucket(bucket)
                .send()
                .await
                .map_err(classify)?;
            return Ok(());
        }

        let rules = rules
            .iter()
            .map(|rule| {
                S3CorsRule::builder()
                    .set_id(rule.id.clone())
                    .set_allowed_headers(Some(rule.allowed_headers.clone()))
                    .set_allowed_methods(Some(rule.allowed_methods.clone()))
                    .set_allowed_origins(Some(rule.allowed_origins.clone()))
                    .set_expose_headers(Some(rule.expose_headers.clone()))
                    .set_max_age_seconds(rule.max_age_seconds)
                    .build()
                    .map_err(invalid_input)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let config = CorsConfiguration::builder()
            .set_cors_rules(Some(rules))
            .build()
            .map_err(invalid_input)?;
        self.client
            .put_bucket_cors()
            .bucket(bucket)
            .cors_configuration(config)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_bucket_tagging(&self, bucket: &str) -> BackendResult<Vec<Tag>> {
        let output = self
            .client
            .get_bucket_tagging()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        Ok(output
            .tag_set()
            .iter()
            .map(|tag| Tag::new(tag.key(), tag.value()))
            .collect())
    }

    async fn put_bucket_tagging(&self, bucket: &str, tags: &[Tag]) -> BackendResult<()> {
        if tags.is_empty() {
            self.client
                .delete_bucket_tagging()
                .bucket(bucket)
                .send()
                .await
                .map_err(classify)?;
            return Ok(());
        }

        let tag_set = tags
            .iter()
            .map(|tag| {
                S3Tag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build()
                    .map_err(invalid_input)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let tagging = Tagging::builder()
            .set_tag_set(Some(tag_set))
            .build()
            .map_err(invalid_input)?;
        self.client
            .put_bucket_tagging()
            .bucket(bucket)
            .tagging(tagging)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_bucket_accelerate(&self, bucket: &str) -> BackendResult<Option<String>> {
        let output = self
            .client
            .get_bucket_accelerate_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.status().map(|s| s.as_str().to_string()))
    }

    async fn put_bucket_accelerate(&self, bucket: &str, status: &str) -> BackendResult<()> {
        self.client
            .put_bucket_accelerate_configuration()
            .bucket(bucket)
            .accelerate_configuration(
                AccelerateConfiguration::builder()
                    .status(BucketAccelerateStatus::from(status))
                    .build(),
            )
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
