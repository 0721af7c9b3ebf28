//! SDK-backed implementations of the backend traits.
//!
//! A client is built for every request from its [`ConnectionParameters`]:
//! static credentials, the caller's endpoint and region, SDK retries turned
//! off and a per-operation timeout taken from the server configuration.

pub mod error;
pub mod iam;
pub mod s3;
pub mod sns;
pub mod sqs;

use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};

use crate::{
    models::connection::ConnectionParameters,
    services::backend::{
        BackendFactory, IdentityBackend, QueueBackend, StorageBackend, TopicBackend,
    },
};

const PROVIDER_NAME: &str = "emulator-console";

/// Factory producing fresh SDK clients; holds no connection state of its own.
#[derive(Clone, Debug)]
pub struct AwsBackendFactory {
    operation_timeout: Duration,
}

impl AwsBackendFactory {
    pub fn new(operation_timeout: Duration) -> Self {
        Self { operation_timeout }
    }
}

// The SDK crates generate one config builder per service with identical
// setters, so the shared settings are applied through a macro.
macro_rules! service_config {
    ($sdk:ident, $conn:expr, $timeout:expr) => {{
        let conn: &ConnectionParameters = $conn;
        $sdk::config::Builder::new()
            .behavior_version($sdk::config::BehaviorVersion::latest())
            .region($sdk::config::Region::new(conn.region.trim().to_string()))
            .endpoint_url(conn.endpoint.trim())
            .credentials_provider($sdk::config::Credentials::new(
                conn.access_key.trim(),
                conn.secret_key.trim(),
                None,
                None,
                PROVIDER_NAME,
            ))
            .retry_config($sdk::config::retry::RetryConfig::disabled())
            .timeout_config(
                $sdk::config::timeout::TimeoutConfig::builder()
                    .operation_timeout($timeout)
                    .build(),
            )
    }};
}

impl BackendFactory for AwsBackendFactory {
    fn storage(&self, conn: &ConnectionParameters) -> Arc<dyn StorageBackend> {
        let config = service_config!(aws_sdk_s3, conn, self.operation_timeout)
            .force_path_style(conn.force_path_style)
            .build();
        Arc::new(s3::S3Backend::new(
            aws_sdk_s3::Client::from_conf(config),
            conn.region.trim(),
        ))
    }

    fn queues(&self, conn: &ConnectionParameters) -> Arc<dyn QueueBackend> {
        let config = service_config!(aws_sdk_sqs, conn, self.operation_timeout).build();
        Arc::new(sqs::SqsBackend::new(aws_sdk_sqs::Client::from_conf(config)))
    }

    fn topics(&self, conn: &ConnectionParameters) -> Arc<dyn TopicBackend> {
        let config = service_config!(aws_sdk_sns, conn, self.operation_timeout).build();
        Arc::new(sns::SnsBackend::new(aws_sdk_sns::Client::from_conf(config)))
    }

    fn identity(&self, conn: &ConnectionParameters) -> Arc<dyn IdentityBackend> {
        let config = service_config!(aws_sdk_iam, conn, self.operation_timeout).build();
        Arc::new(iam::IamBackend::new(aws_sdk_iam::Client::from_conf(config)))
    }
}

/// Convert an SDK timestamp; `None` when it does not fit chrono's range.
pub(crate) fn timestamp(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}
