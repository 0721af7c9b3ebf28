//! HTTP handlers for topics, subscriptions and publishing.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{json_body, required, required_raw};
use crate::{
    errors::AppError,
    models::{
        connection::{ConnectionParameters, ConnectionQuery},
        envelope::ApiResponse,
        queue::MessageAttribute,
        tag::Tag,
        topic::{
            CreatedSubscription, PublishedMessage, SubscriptionDetails, SubscriptionList,
            TopicDetails, TopicList, TopicSummary,
        },
    },
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicQuery {
    pub topic_arn: Option<String>,
    pub subscription_arn: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub topic_arn: Option<String>,
    pub protocol: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub subscription_arn: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub topic_arn: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub message_attributes: BTreeMap<String, MessageAttribute>,
}

/// Attribute values as the service expects them: strings verbatim, other
/// JSON scalars in their JSON form, `null` as empty (and therefore skipped).
fn attribute_strings(attributes: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    attributes
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, value)
        })
        .collect()
}

/// GET `/api/sns/topics`
pub async fn list_topics(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<TopicList>, AppError> {
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    let topics = topics.list_topics().await?;
    let message = format!("Successfully loaded {} topics", topics.len());
    Ok(ApiResponse::ok(TopicList { topics }, message))
}

/// POST `/api/sns/topics`
pub async fn create_topic(
    State(state): State<AppState>,
    body: Result<Json<CreateTopicReq>, JsonRejection>,
) -> Result<ApiResponse<TopicSummary>, AppError> {
    let req = json_body(body)?;
    let name = required(req.name.as_deref(), "Topic name")?;
    let topics = state.topics(&req.config)?;
    let topic = topics.create_topic(&name).await?;
    Ok(ApiResponse::ok(
        topic,
        format!("Successfully created topic \"{name}\""),
    ))
}

/// DELETE `/api/sns/topics`
pub async fn delete_topic(
    State(state): State<AppState>,
    Query(ids): Query<TopicQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let topic_arn = required(ids.topic_arn.as_deref(), "Topic ARN")?;
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    topics.delete_topic(&topic_arn).await?;
    Ok(ApiResponse::done("Topic deleted successfully"))
}

/// GET `/api/sns/topics/attributes`
pub async fn get_topic_attributes(
    State(state): State<AppState>,
    Query(ids): Query<TopicQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<TopicDetails>, AppError> {
    let topic_arn = required(ids.topic_arn.as_deref(), "Topic ARN")?;
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    let details = topics.topic_details(&topic_arn).await?;
    Ok(ApiResponse::ok(
        details,
        "Successfully retrieved topic attributes",
    ))
}

/// PUT `/api/sns/topics/attributes`
pub async fn update_topic_attributes(
    State(state): State<AppState>,
    body: Result<Json<UpdateTopicReq>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = json_body(body)?;
    let topic_arn = required(req.topic_arn.as_deref(), "Topic ARN")?;
    let topics = state.topics(&req.config)?;
    topics
        .update_topic(
            &topic_arn,
            &attribute_strings(req.attributes),
            req.tags.as_deref(),
        )
        .await?;
    Ok(ApiResponse::done("Topic attributes updated successfully"))
}

/// GET `/api/sns/subscriptions`
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(ids): Query<TopicQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<SubscriptionList>, AppError> {
    let topic_arn = required(ids.topic_arn.as_deref(), "Topic ARN")?;
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    let subscriptions = topics.list_subscriptions(&topic_arn).await?;
    let message = format!("Successfully loaded {} subscriptions", subscriptions.len());
    Ok(ApiResponse::ok(SubscriptionList { subscriptions }, message))
}

/// POST `/api/sns/subscriptions`
pub async fn subscribe(
    State(state): State<AppState>,
    body: Result<Json<SubscribeReq>, JsonRejection>,
) -> Result<ApiResponse<CreatedSubscription>, AppError> {
    let req = json_body(body)?;
    let topic_arn = required(req.topic_arn.as_deref(), "Topic ARN")?;
    let protocol = required(req.protocol.as_deref(), "Protocol")?;
    let endpoint = required(req.endpoint.as_deref(), "Endpoint")?;
    let topics = state.topics(&req.config)?;
    let subscription_arn = topics.subscribe(&topic_arn, &protocol, &endpoint).await?;
    Ok(ApiResponse::ok(
        CreatedSubscription {
            subscription_arn,
            topic_arn,
            protocol,
            endpoint,
        },
        "Subscription created successfully",
    ))
}

/// DELETE `/api/sns/subscriptions`
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(ids): Query<TopicQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let subscription_arn = required(ids.subscription_arn.as_deref(), "Subscription ARN")?;
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    topics.unsubscribe(&subscription_arn).await?;
    Ok(ApiResponse::done("Subscription deleted successfully"))
}

/// GET `/api/sns/subscriptions/attributes`
pub async fn get_subscription_attributes(
    State(state): State<AppState>,
    Query(ids): Query<TopicQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<SubscriptionDetails>, AppError> {
    let subscription_arn = required(ids.subscription_arn.as_deref(), "Subscription ARN")?;
    let topics = state.topics(&ConnectionParameters::from(conn))?;
    let attributes = topics.subscription_attributes(&subscription_arn).await?;
    Ok(ApiResponse::ok(
        SubscriptionDetails { attributes },
        "Successfully retrieved subscription attributes",
    ))
}

/// PUT `/api/sns/subscriptions/attributes`
pub async fn update_subscription_attributes(
    State(state): State<AppState>,
    body: Result<Json<UpdateSubscriptionReq>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = json_body(body)?;
    let subscription_arn = required(req.subscription_arn.as_deref(), "Subscription ARN")?;
    let topics = state.topics(&req.config)?;
    topics
        .update_subscription(&subscription_arn, &attribute_strings(req.attributes))
        .await?;
    Ok(ApiResponse::done(
        "Subscription attributes updated successfully",
    ))
}

/// POST `/api/sns/messages`
pub async fn publish(
    State(state): State<AppState>,
    body: Result<Json<PublishReq>, JsonRejection>,
) -> Result<ApiResponse<PublishedMessage>, AppError> {
    let req = json_body(body)?;
    let topic_arn = required(req.topic_arn.as_deref(), "Topic ARN")?;
    let message = required_raw(req.message.as_deref(), "Message")?;
    let subject = req.subject.filter(|s| !s.trim().is_empty());
    let topics = state.topics(&req.config)?;
    let message_id = topics
        .publish(
            &topic_arn,
            &message,
            subject.as_deref(),
            &req.message_attributes,
        )
        .await?;
    Ok(ApiResponse::ok(
        PublishedMessage {
            message_id,
            topic_arn,
            message,
            subject,
        },
        "Message published successfully",
    ))
}
