use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info};

use crate::{
    models::queue::{QueueMessage, QueueSummary},
    services::backend::{BackendResult, QueueBackend},
};

/// Messages fetched per receive call (the service maximum).
pub const RECEIVE_BATCH: i32 = 10;
/// Long-poll wait per receive call, in seconds.
pub const RECEIVE_WAIT_SECS: i32 = 1;

/// Queue URL for a queue addressed by name, as the emulator lays them out.
pub fn derive_queue_url(endpoint_base: &str, account_id: &str, queue: &str) -> String {
    format!("{endpoint_base}/{account_id}/{queue}")
}

#[derive(Clone)]
pub struct QueueService {
    backend: Arc<dyn QueueBackend>,
}

impl QueueService {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self { backend }
    }

    /// Every queue with its attributes and tags; a queue whose details cannot
    /// be read is still listed, without them.
    pub async fn list_queues(&self) -> BackendResult<Vec<QueueSummary>> {
        let urls = self.backend.list_queues().await?;
        let mut queues = Vec::with_capacity(urls.len());
        for url in urls {
            let mut summary = QueueSummary::bare(url);
            let details = async {
                let attributes = self.backend.get_queue_attributes(&summary.queue_url).await?;
                let tags = self.backend.list_queue_tags(&summary.queue_url).await?;
                BackendResult::Ok((attributes, tags))
            }
            .await;
            match details {
                Ok((attributes, tags)) => {
                    summary.attributes = Some(attributes);
                    summary.tags = Some(tags);
                }
                Err(err) => {
                    debug!(queue = %summary.queue_url, error = %err, "queue details unavailable")
                }
            }
            queues.push(summary);
        }
        Ok(queues)
    }

    pub async fn create_queue(
        &self,
        queue_name: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<String> {
        let url = self.backend.create_queue(queue_name, attributes).await?;
        info!(queue = queue_name, %url, "created queue");
        Ok(url)
    }

    pub async fn delete_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.backend.delete_queue(queue_url).await?;
        info!(queue = queue_url, "deleted queue");
        Ok(())
    }

    pub async fn purge_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.backend.purge_queue(queue_url).await?;
        info!(queue = queue_url, "purged queue");
        Ok(())
    }

    pub async fn set_attributes(
        &self,
        queue_url: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<()> {
        self.backend.set_queue_attributes(queue_url, attributes).await
    }

    pub async fn receive_messages(&self, queue_url: &str) -> BackendResult<Vec<QueueMessage>> {
        self.backend
            .receive_messages(queue_url, RECEIVE_BATCH, RECEIVE_WAIT_SECS)
            .await
    }

    pub async fn send_message(&self, queue_url: &str, body: &str) -> BackendResult<String> {
        let message_id = self.backend.send_message(queue_url, body).await?;
        debug!(queue = queue_url, %message_id, "sent message");
        Ok(message_id)
    }

    pub async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> BackendResult<()> {
        self.backend.delete_message(queue_url, receipt_handle).await
    }
}
