//! HTTP handlers for queues and their messages.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{json_body, required, required_raw};
use crate::{
    errors::AppError,
    models::{
        connection::{ConnectionParameters, ConnectionQuery},
        envelope::ApiResponse,
        queue::{QueueMessage, QueueSummary, SentMessage},
    },
    services::queue_service::derive_queue_url,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    pub queue_url: Option<String>,
    pub action: Option<String>,
    pub receipt_handle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub queue_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueAttributesReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub queue_url: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub queue_url: Option<String>,
    pub message_body: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQueue {
    pub queue_url: String,
}

/// GET `/api/sqs/queues`
pub async fn list_queues(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<QueueSummary>>, AppError> {
    let queues = state.queues(&ConnectionParameters::from(conn))?;
    let list = queues.list_queues().await?;
    let message = format!("Successfully loaded {} queues", list.len());
    Ok(ApiResponse::ok(list, message))
}

/// POST `/api/sqs/queues`
pub async fn create_queue(
    State(state): State<AppState>,
    body: Result<Json<CreateQueueReq>, JsonRejection>,
) -> Result<ApiResponse<CreatedQueue>, AppError> {
    let req = json_body(body)?;
    let name = required(req.queue_name.as_deref(), "Queue name")?;
    let queues = state.queues(&req.config)?;
    let queue_url = queues.create_queue(&name, req.attributes).await?;
    Ok(ApiResponse::ok(
        CreatedQueue { queue_url },
        format!("Successfully created queue \"{name}\""),
    ))
}

/// DELETE `/api/sqs/queues`
pub async fn delete_queue(
    State(state): State<AppState>,
    Query(ids): Query<QueueQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let queue_url = required(ids.queue_url.as_deref(), "Queue URL")?;
    let queues = state.queues(&ConnectionParameters::from(conn))?;
    queues.delete_queue(&queue_url).await?;
    Ok(ApiResponse::done("Successfully deleted queue"))
}

/// PUT `/api/sqs/queues?action=purge`
pub async fn purge_queue(
    State(state): State<AppState>,
    Query(ids): Query<QueueQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let queue_url = required(ids.queue_url.as_deref(), "Queue URL")?;
    if ids.action.as_deref() != Some("purge") {
        return Err(AppError::validation(
            "Invalid action. Only \"purge\" is supported",
        ));
    }
    let queues = state.queues(&ConnectionParameters::from(conn))?;
    queues.purge_queue(&queue_url).await?;
    Ok(ApiResponse::done(
        "Successfully purged all messages from the queue",
    ))
}

/// PUT `/api/sqs/queues/attributes`
pub async fn update_queue_attributes(
    State(state): State<AppState>,
    body: Result<Json<QueueAttributesReq>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = json_body(body)?;
    let queue_url = required(req.queue_url.as_deref(), "Queue URL")?;
    if req.attributes.is_empty() {
        return Err(AppError::validation("At least one attribute is required"));
    }
    let queues = state.queues(&req.config)?;
    queues.set_attributes(&queue_url, req.attributes).await?;
    Ok(ApiResponse::done("Successfully updated queue attributes"))
}

/// GET `/api/sqs/messages`
pub async fn receive_messages(
    State(state): State<AppState>,
    Query(ids): Query<QueueQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<QueueMessage>>, AppError> {
    let queue_url = required(ids.queue_url.as_deref(), "Queue URL")?;
    receive_from(&state, &queue_url, ConnectionParameters::from(conn)).await
}

/// POST `/api/sqs/messages`
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageReq>, JsonRejection>,
) -> Result<ApiResponse<SentMessage>, AppError> {
    let req = json_body(body)?;
    let queue_url = required(req.queue_url.as_deref(), "Queue URL")?;
    let message_body = required(req.message_body.as_deref(), "Message body")?;
    send_to(&state, &queue_url, &message_body, &req.config).await
}

/// DELETE `/api/sqs/messages`
pub async fn delete_message(
    State(state): State<AppState>,
    Query(ids): Query<QueueQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let queue_url = required(ids.queue_url.as_deref(), "Queue URL")?;
    let receipt_handle = required_raw(ids.receipt_handle.as_deref(), "Receipt handle")?;
    delete_from(&state, &queue_url, &receipt_handle, ConnectionParameters::from(conn)).await
}

/// GET `/api/sqs/{queue}/messages`
pub async fn receive_named(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<QueueMessage>>, AppError> {
    let conn = ConnectionParameters::from(conn);
    let queue_url = named_queue_url(&state, &conn, &queue)?;
    receive_from(&state, &queue_url, conn).await
}

/// POST `/api/sqs/{queue}/messages`
pub async fn send_named(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    body: Result<Json<SendMessageReq>, JsonRejection>,
) -> Result<ApiResponse<SentMessage>, AppError> {
    let req = json_body(body)?;
    let queue_url = named_queue_url(&state, &req.config, &queue)?;
    let message_body = required(req.message_body.as_deref(), "Message body")?;
    send_to(&state, &queue_url, &message_body, &req.config).await
}

/// DELETE `/api/sqs/{queue}/messages`
pub async fn delete_named(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    Query(ids): Query<QueueQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let conn = ConnectionParameters::from(conn);
    let queue_url = named_queue_url(&state, &conn, &queue)?;
    let receipt_handle = required_raw(ids.receipt_handle.as_deref(), "Receipt handle")?;
    delete_from(&state, &queue_url, &receipt_handle, conn).await
}

fn named_queue_url(
    state: &AppState,
    conn: &ConnectionParameters,
    queue: &str,
) -> Result<String, AppError> {
    let queue = required(Some(queue), "Queue name")?;
    Ok(derive_queue_url(
        conn.endpoint_base(),
        state.account_id(),
        &queue,
    ))
}

async fn receive_from(
    state: &AppState,
    queue_url: &str,
    conn: ConnectionParameters,
) -> Result<ApiResponse<Vec<QueueMessage>>, AppError> {
    let queues = state.queues(&conn)?;
    let messages = queues.receive_messages(queue_url).await?;
    let message = format!("Successfully loaded {} messages", messages.len());
    Ok(ApiResponse::ok(messages, message))
}

async fn send_to(
    state: &AppState,
    queue_url: &str,
    body: &str,
    conn: &ConnectionParameters,
) -> Result<ApiResponse<SentMessage>, AppError> {
    let queues = state.queues(conn)?;
    let message_id = queues.send_message(queue_url, body).await?;
    Ok(ApiResponse::ok(
        SentMessage { message_id },
        "Successfully sent message to the queue",
    ))
}

async fn delete_from(
    state: &AppState,
    queue_url: &str,
    receipt_handle: &str,
    conn: ConnectionParameters,
) -> Result<ApiResponse<()>, AppError> {
    let queues = state.queues(&conn)?;
    queues.delete_message(queue_url, receipt_handle).await?;
    Ok(ApiResponse::done(
        "Successfully deleted message from the queue",
    ))
}
