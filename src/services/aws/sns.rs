use async_trait::async_trait;
use aws_sdk_sns::{
    Client,
    types::{MessageAttributeValue, Tag as SnsTag},
};
use std::collections::{BTreeMap, HashMap};

use super::error::{classify, invalid_input};
use crate::{
    models::{queue::MessageAttribute, tag::Tag, topic::Subscription},
    services::backend::{BackendResult, TopicBackend},
};

pub struct SnsBackend {
    client: Client,
}

impl SnsBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn sorted(attributes: Option<&HashMap<String, String>>) -> BTreeMap<String, String> {
    attributes
        .map(|attrs| attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

#[async_trait]
impl TopicBackend for SnsBackend {
    async fn list_topics(&self) -> BackendResult<Vec<String>> {
        let mut arns = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_topics()
                .set_next_token(token.take())
                .send()
                .await
                .map_err(classify)?;
            arns.extend(
                output
                    .topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn())
                    .map(str::to_string),
            );
            match output.next_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(arns)
    }

    async fn create_topic(&self, name: &str) -> BackendResult<String> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.topic_arn().unwrap_or_default().to_string())
    }

    async fn delete_topic(&self, topic_arn: &str) -> BackendResult<()> {
        self.client
            .delete_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_topic_attributes(
        &self,
        topic_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        let output = self
            .client
            .get_topic_attributes()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(sorted(output.attributes()))
    }

    async fn set_topic_attribute(
        &self,
        topic_arn: &str,
        name: &str,
        value: &str,
    ) -> BackendResult<()> {
        self.client
            .set_topic_attributes()
            .topic_arn(topic_arn)
            .attribute_name(name)
            .attribute_value(value)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_tags(&self, resource_arn: &str) -> BackendResult<Vec<Tag>> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(resource_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(output
            .tags()
            .iter()
            .map(|tag| Tag::new(tag.key(), tag.value()))
            .collect())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: &[Tag]) -> BackendResult<()> {
        let tags = tags
            .iter()
            .map(|tag| {
                SnsTag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build()
                    .map_err(invalid_input)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.client
            .tag_resource()
            .resource_arn(resource_arn)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, keys: &[String]) -> BackendResult<()> {
        self.client
            .untag_resource()
            .resource_arn(resource_arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_subscriptions(&self, topic_arn: &str) -> BackendResult<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_subscriptions_by_topic()
                .topic_arn(topic_arn)
                .set_next_token(token.take())
                .send()
                .await
                .map_err(classify)?;
            subscriptions.extend(output.subscriptions().iter().map(|sub| Subscription {
                subscription_arn: sub.subscription_arn().map(str::to_string),
                protocol: sub.protocol().map(str::to_string),
                endpoint: sub.endpoint().map(str::to_string),
                owner: sub.owner().map(str::to_string),
                topic_arn: sub.topic_arn().map(str::to_string),
            }));
            match output.next_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(subscriptions)
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> BackendResult<Option<String>> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .return_subscription_arn(true)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.subscription_arn().map(str::to_string))
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> BackendResult<()> {
        self.client
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_subscription_attributes(
        &self,
        subscription_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        let output = self
            .client
            .get_subscription_attributes()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(sorted(output.attributes()))
    }

    async fn set_subscription_attribute(
        &self,
        subscription_arn: &str,
        name: &str,
        value: &str,
    ) -> BackendResult<()> {
        self.client
            .set_subscription_attributes()
            .subscription_arn(subscription_arn)
            .attribute_name(name)
            .attribute_value(value)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
        attributes: &BTreeMap<String, MessageAttribute>,
    ) -> BackendResult<Option<String>> {
        let mut request = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .set_subject(subject.map(str::to_string));
        for (name, attribute) in attributes {
            let value = MessageAttributeValue::builder()
                .data_type(&attribute.data_type)
                .set_string_value(attribute.string_value.clone())
                .build()
                .map_err(invalid_input)?;
            request = request.message_attributes(name, value);
        }
        let output = request.send().await.map_err(classify)?;
        Ok(output.message_id().map(str::to_string))
    }
}
