use async_trait::async_trait;
use aws_sdk_sqs::{
    Client,
    types::{Message, MessageSystemAttributeName, QueueAttributeName},
};
use std::collections::{BTreeMap, HashMap};

use super::error::classify;
use crate::{
    models::queue::{MessageAttribute, QueueMessage},
    services::backend::{BackendResult, QueueBackend},
};

pub struct SqsBackend {
    client: Client,
}

impl SqsBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn attribute_names(attributes: BTreeMap<String, String>) -> HashMap<QueueAttributeName, String> {
    attributes
        .into_iter()
        .map(|(name, value)| (QueueAttributeName::from(name.as_str()), value))
        .collect()
}

fn queue_message(message: &Message) -> QueueMessage {
    QueueMessage {
        message_id: message.message_id().unwrap_or_default().to_string(),
        receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
        body: message.body().unwrap_or_default().to_string(),
        md5_of_body: message.md5_of_body().map(str::to_string),
        attributes: message
            .attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default(),
        message_attributes: message
            .message_attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, value)| {
                        let attribute = MessageAttribute {
                            data_type: value.data_type().to_string(),
                            string_value: value.string_value().map(str::to_string),
                        };
                        (name.clone(), attribute)
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[async_trait]
impl QueueBackend for SqsBackend {
    async fn list_queues(&self) -> BackendResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_queues()
                .set_next_token(token.take())
                .send()
                .await
                .map_err(classify)?;
            urls.extend(output.queue_urls().iter().cloned());
            match output.next_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(urls)
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await
            .map_err(classify)?;
        Ok(output
            .attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_queue_tags(&self, queue_url: &str) -> BackendResult<BTreeMap<String, String>> {
        let output = self
            .client
            .list_queue_tags()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(classify)?;
        Ok(output
            .tags()
            .map(|tags| tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<String> {
        let attributes = (!attributes.is_empty()).then(|| attribute_names(attributes));
        let output = self
            .client
            .create_queue()
            .queue_name(queue_name)
            .set_attributes(attributes)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.queue_url().unwrap_or_default().to_string())
    }

    async fn delete_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn purge_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.client
            .purge_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: BTreeMap<String, String>,
    ) -> BackendResult<()> {
        self.client
            .set_queue_attributes()
            .queue_url(queue_url)
            .set_attributes(Some(attribute_names(attributes)))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> BackendResult<String> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> BackendResult<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(classify)?;
        Ok(output.messages().iter().map(queue_message).collect())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> BackendResult<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sqs::types::MessageAttributeValue;

    #[test]
    fn received_message_maps_all_members() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body("hello")
            .attributes(MessageSystemAttributeName::SenderId, "AIDA")
            .message_attributes(
                "region",
                MessageAttributeValue::builder()
                    .data_type("String")
                    .string_value("eu")
                    .build()
                    .unwrap(),
            )
            .build();

        let mapped = queue_message(&message);
        assert_eq!(mapped.message_id, "m-1");
        assert_eq!(mapped.receipt_handle, "rh-1");
        assert_eq!(mapped.attributes["SenderId"], "AIDA");
        assert_eq!(mapped.message_attributes["region"].data_type, "String");
        assert_eq!(
            mapped.message_attributes["region"].string_value.as_deref(),
            Some("eu")
        );
    }

    #[test]
    fn sparse_message_gets_empty_defaults() {
        let mapped = queue_message(&Message::builder().build());
        assert_eq!(mapped.body, "");
        assert!(mapped.attributes.is_empty());
        assert!(mapped.message_attributes.is_empty());
    }
}
