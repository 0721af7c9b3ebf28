use std::sync::Arc;

use crate::{
    errors::AppError,
    models::connection::ConnectionParameters,
    services::{
        backend::BackendFactory, identity_service::IdentityService, queue_service::QueueService,
        storage_service::StorageService, topic_service::TopicService,
    },
};

/// Shared, immutable state handed to every handler.
///
/// Holds no connection to the emulator: each accessor validates the caller's
/// parameters and only then asks the factory for a fresh client, so an
/// invalid request never produces a backend call.
#[derive(Clone)]
pub struct AppState {
    backends: Arc<dyn BackendFactory>,
    account_id: Arc<str>,
    defaults: Arc<ConnectionParameters>,
}

impl AppState {
    pub fn new(
        backends: Arc<dyn BackendFactory>,
        account_id: impl Into<String>,
        defaults: ConnectionParameters,
    ) -> Self {
        Self {
            backends,
            account_id: Arc::from(account_id.into()),
            defaults: Arc::new(defaults),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn defaults(&self) -> &ConnectionParameters {
        &self.defaults
    }

    pub fn storage(&self, conn: &ConnectionParameters) -> Result<StorageService, AppError> {
        conn.validate()?;
        Ok(StorageService::new(self.backends.storage(conn)))
    }

    pub fn queues(&self, conn: &ConnectionParameters) -> Result<QueueService, AppError> {
        conn.validate()?;
        Ok(QueueService::new(self.backends.queues(conn)))
    }

    pub fn topics(&self, conn: &ConnectionParameters) -> Result<TopicService, AppError> {
        conn.validate()?;
        Ok(TopicService::new(self.backends.topics(conn)))
    }

    pub fn identity(&self, conn: &ConnectionParameters) -> Result<IdentityService, AppError> {
        conn.validate()?;
        Ok(IdentityService::new(
            self.backends.identity(conn),
            self.account_id.as_ref(),
        ))
    }
}
