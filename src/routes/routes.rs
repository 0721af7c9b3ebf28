//! Defines the proxy's HTTP surface.
//!
//! ## Structure
//! - **S3**: `/api/s3/buckets`, `/api/s3/buckets/attributes`, `/api/s3/objects`,
//!   the per-bucket `/api/s3/{bucket}/...` forms, and `/api/s3/upload` (SSE)
//!   plus `/api/s3/download` (presigned URL).
//! - **SQS**: `/api/sqs/queues`, `/api/sqs/queues/attributes`,
//!   `/api/sqs/messages` and the by-name `/api/sqs/{queue}/messages`.
//! - **SNS**: topics, subscriptions (each with `/attributes`) and `/messages`.
//! - **IAM**: users, roles and policies.
//!
//! Static segments take precedence over `{bucket}`/`{queue}` captures, so a
//! bucket literally named `buckets` is only reachable through the body or
//! query forms.

use crate::{
    handlers::{
        config_handlers::default_connection,
        health_handlers::healthz,
        iam_handlers::{
            create_policy, create_role, create_user, delete_policy, delete_role, delete_user,
            list_policies, list_roles, list_users,
        },
        s3_handlers::{
            create_bucket, delete_bucket, delete_bucket_object, delete_object, download_object,
            get_bucket_attributes, list_bucket_objects, list_buckets, list_objects, object_tree,
            presigned_download, update_bucket_attributes, upload_bucket_object, upload_object,
            upload_with_progress,
        },
        sns_handlers::{
            create_topic, delete_topic, get_subscription_attributes, get_topic_attributes,
            list_subscriptions, list_topics, publish, subscribe, unsubscribe,
            update_subscription_attributes, update_topic_attributes,
        },
        sqs_handlers::{
            create_queue, delete_message, delete_named, delete_queue, list_queues, purge_queue,
            receive_messages, receive_named, send_message, send_named, update_queue_attributes,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for every proxy route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/aws-config", get(default_connection))
        .merge(s3_routes())
        .merge(sqs_routes())
        .merge(sns_routes())
        .merge(iam_routes())
}

fn s3_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/s3/buckets",
            get(list_buckets).post(create_bucket).delete(delete_bucket),
        )
        .route(
            "/api/s3/buckets/attributes",
            get(get_bucket_attributes).put(update_bucket_attributes),
        )
        .route(
            "/api/s3/objects",
            get(list_objects).post(upload_object).delete(delete_object),
        )
        .route("/api/s3/upload", post(upload_with_progress))
        .route("/api/s3/download", get(presigned_download))
        .route(
            "/api/s3/{bucket}/objects",
            get(list_bucket_objects)
                .post(upload_bucket_object)
                .delete(delete_bucket_object),
        )
        .route("/api/s3/{bucket}/tree", get(object_tree))
        .route("/api/s3/{bucket}/upload", post(upload_bucket_object))
        .route("/api/s3/{bucket}/download", get(download_object))
}

fn sqs_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sqs/queues",
            get(list_queues)
                .post(create_queue)
                .delete(delete_queue)
                .put(purge_queue),
        )
        .route("/api/sqs/queues/attributes", put(update_queue_attributes))
        .route(
            "/api/sqs/messages",
            get(receive_messages)
                .post(send_message)
                .delete(delete_message),
        )
        .route(
            "/api/sqs/{queue}/messages",
            get(receive_named).post(send_named).delete(delete_named),
        )
}

fn sns_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sns/topics",
            get(list_topics).post(create_topic).delete(delete_topic),
        )
        .route(
            "/api/sns/topics/attributes",
            get(get_topic_attributes).put(update_topic_attributes),
        )
        .route(
            "/api/sns/subscriptions",
            get(list_subscriptions).post(subscribe).delete(unsubscribe),
        )
        .route(
            "/api/sns/subscriptions/attributes",
            get(get_subscription_attributes).put(update_subscription_attributes),
        )
        .route("/api/sns/messages", post(publish))
}

fn iam_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/iam/users",
            get(list_users).post(create_user).delete(delete_user),
        )
        .route(
            "/api/iam/roles",
            get(list_roles).post(create_role).delete(delete_role),
        )
        .route(
            "/api/iam/policies",
            get(list_policies).post(create_policy).delete(delete_policy),
        )
}
