use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use tracing::{debug, info};

use crate::{
    models::{
        queue::MessageAttribute,
        tag::Tag,
        topic::{Subscription, TopicDetails, TopicSummary},
    },
    services::backend::{BackendResult, TopicBackend},
};

#[derive(Clone)]
pub struct TopicService {
    backend: Arc<dyn TopicBackend>,
}

impl TopicService {
    pub fn new(backend: Arc<dyn TopicBackend>) -> Self {
        Self { backend }
    }

    pub async fn list_topics(&self) -> BackendResult<Vec<TopicSummary>> {
        let arns = self.backend.list_topics().await?;
        Ok(arns.into_iter().map(TopicSummary::from_arn).collect())
    }

    pub async fn create_topic(&self, name: &str) -> BackendResult<TopicSummary> {
        let topic_arn = self.backend.create_topic(name).await?;
        info!(topic = name, %topic_arn, "created topic");
        Ok(TopicSummary {
            topic_arn,
            name: name.to_string(),
        })
    }

    pub async fn delete_topic(&self, topic_arn: &str) -> BackendResult<()> {
        self.backend.delete_topic(topic_arn).await?;
        info!(topic = topic_arn, "deleted topic");
        Ok(())
    }

    pub async fn topic_details(&self, topic_arn: &str) -> BackendResult<TopicDetails> {
        let attributes = self.backend.get_topic_attributes(topic_arn).await?;
        let tags = self.backend.list_tags(topic_arn).await?;
        Ok(TopicDetails { attributes, tags })
    }

    /// Set every non-empty attribute, then, when `tags` is given, make it the
    /// topic's exact tag set.
    pub async fn update_topic(
        &self,
        topic_arn: &str,
        attributes: &BTreeMap<String, String>,
        tags: Option<&[Tag]>,
    ) -> BackendResult<()> {
        for (name, value) in non_empty(attributes) {
            self.backend.set_topic_attribute(topic_arn, name, value).await?;
        }

        if let Some(tags) = tags {
            let existing = self.backend.list_tags(topic_arn).await?;
            let removed = removed_keys(&existing, tags);
            if !removed.is_empty() {
                debug!(topic = topic_arn, ?removed, "removing tags");
                self.backend.untag_resource(topic_arn, &removed).await?;
            }
            if !tags.is_empty() {
                self.backend.tag_resource(topic_arn, tags).await?;
            }
        }
        Ok(())
    }

    pub async fn list_subscriptions(&self, topic_arn: &str) -> BackendResult<Vec<Subscription>> {
        self.backend.list_subscriptions(topic_arn).await
    }

    pub async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> BackendResult<Option<String>> {
        let arn = self.backend.subscribe(topic_arn, protocol, endpoint).await?;
        info!(topic = topic_arn, protocol, subscription = ?arn, "subscribed");
        Ok(arn)
    }

    pub async fn unsubscribe(&self, subscription_arn: &str) -> BackendResult<()> {
        self.backend.unsubscribe(subscription_arn).await
    }

    pub async fn subscription_attributes(
        &self,
        subscription_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        self.backend.get_subscription_attributes(subscription_arn).await
    }

    pub async fn update_subscription(
        &self,
        subscription_arn: &str,
        attributes: &BTreeMap<String, String>,
    ) -> BackendResult<()> {
        for (name, value) in non_empty(attributes) {
            self.backend
                .set_subscription_attribute(subscription_arn, name, value)
                .await?;
        }
        Ok(())
    }

    pub async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
        attributes: &BTreeMap<String, MessageAttribute>,
    ) -> BackendResult<Option<String>> {
        self.backend
            .publish(topic_arn, message, subject, attributes)
            .await
    }
}

fn non_empty(attributes: &BTreeMap<String, String>) -> impl Iterator<Item = (&str, &str)> {
    attributes
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

/// Keys present on the resource but absent from the desired tag set.
fn removed_keys(existing: &[Tag], desired: &[Tag]) -> Vec<String> {
    let keep: BTreeSet<&str> = desired.iter().map(|t| t.key.as_str()).collect();
    existing
        .iter()
        .filter(|t| !keep.contains(t.key.as_str()))
        .map(|t| t.key.clone())
        .collect()
}
