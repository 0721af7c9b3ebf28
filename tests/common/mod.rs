//! In-memory stand-in for the emulator, shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use emulator_console::{
    app,
    errors::AppError,
    models::{
        bucket::{BucketSummary, CorsRule, EncryptionSettings},
        connection::ConnectionParameters,
        identity::{IamPolicy, IamRole, IamUser},
        multipart::UploadedPart,
        object::{ObjectDownload, ObjectRecord},
        queue::{MessageAttribute, QueueMessage},
        tag::Tag,
        topic::Subscription,
    },
    services::backend::{
        BackendFactory, BackendResult, IdentityBackend, QueueBackend, StorageBackend,
        TopicBackend,
    },
    state::AppState,
};

pub const ACCOUNT_ID: &str = "000000000000";

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Query-string form of a valid local connection.
pub fn conn_query() -> Vec<(&'static str, &'static str)> {
    vec![
        ("endpoint", "http://localhost:4566"),
        ("region", "us-east-1"),
        ("accessKey", "test"),
        ("secretKey", "test"),
        ("forcePathStyle", "true"),
    ]
}

/// Body form of a valid local connection.
pub fn conn_json() -> Value {
    json!({
        "endpoint": "http://localhost:4566",
        "region": "us-east-1",
        "accessKey": "test",
        "secretKey": "test",
        "forcePathStyle": true,
    })
}

#[derive(Default)]
struct Store {
    buckets: BTreeMap<String, BTreeMap<String, (ObjectRecord, Bytes)>>,
    queues: BTreeMap<String, Vec<QueueMessage>>,
    topics: BTreeMap<String, Vec<Tag>>,
    users: Vec<IamUser>,
    policies: Vec<IamPolicy>,
    uploads: HashMap<String, Vec<(i32, Bytes)>>,
}

#[derive(Default)]
struct Inner {
    store: Mutex<Store>,
    /// Names of backend methods in call order.
    calls: Mutex<Vec<String>>,
    clients: AtomicUsize,
    failing_deletes: Mutex<HashSet<String>>,
    failure: Mutex<Option<AppError>>,
    failing_calls: Mutex<HashMap<String, AppError>>,
}

/// Fake emulator; cloning shares its state.
#[derive(Clone, Default)]
pub struct FakeEmulator {
    inner: Arc<Inner>,
}

impl FakeEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self) -> TestServer {
        let state = AppState::new(
            Arc::new(self.clone()),
            ACCOUNT_ID,
            ConnectionParameters {
                endpoint: "http://localhost:4566".into(),
                region: "us-east-1".into(),
                access_key: "test".into(),
                secret_key: "test".into(),
                force_path_style: true,
            },
        );
        TestServer::new(app(state, 64 * 1024 * 1024)).unwrap()
    }

    pub fn with_object(self, bucket: &str, key: &str, body: &'static [u8]) -> Self {
        {
            let mut store = self.inner.store.lock().unwrap();
            let objects = store.buckets.entry(bucket.to_string()).or_default();
            let record = ObjectRecord {
                key: key.to_string(),
                size: body.len() as u64,
                last_modified: ts(1_700_000_000),
                storage_class: Some("STANDARD".into()),
            };
            objects.insert(key.to_string(), (record, Bytes::from_static(body)));
        }
        self
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.inner
            .store
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
        self
    }

    pub fn with_queue(self, url: &str) -> Self {
        self.inner
            .store
            .lock()
            .unwrap()
            .queues
            .entry(url.to_string())
            .or_default();
        self
    }

    /// Make `delete_object` fail for `key`.
    pub fn failing_delete(self, key: &str) -> Self {
        self.inner
            .failing_deletes
            .lock()
            .unwrap()
            .insert(key.to_string());
        self
    }

    /// Make every subsequent backend call fail with `err`.
    pub fn failing_with(self, err: AppError) -> Self {
        *self.inner.failure.lock().unwrap() = Some(err);
        self
    }

    /// Make every call of the backend method `call` fail with `err`.
    pub fn failing_call(self, call: &str, err: AppError) -> Self {
        self.inner
            .failing_calls
            .lock()
            .unwrap()
            .insert(call.to_string(), err);
        self
    }

    pub fn clients_built(&self) -> usize {
        self.inner.clients.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        self.inner
            .store
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object_body(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let store = self.inner.store.lock().unwrap();
        store
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|(_, body)| body.clone())
    }

    /// Multipart uploads started but neither completed nor aborted.
    pub fn open_uploads(&self) -> usize {
        self.inner.store.lock().unwrap().uploads.len()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.inner.store.lock().unwrap().buckets.contains_key(bucket)
    }

    pub fn messages(&self, url: &str) -> Vec<QueueMessage> {
        self.inner
            .store
            .lock()
            .unwrap()
            .queues
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: &str) -> BackendResult<()> {
        self.inner.calls.lock().unwrap().push(call.to_string());
        if let Some(err) = self.inner.failing_calls.lock().unwrap().get(call) {
            return Err(err.clone());
        }
        match self.inner.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn no_bucket(bucket: &str) -> AppError {
        AppError::not_found(format!("The specified bucket does not exist: {bucket}"))
    }

    fn no_queue() -> AppError {
        AppError::not_found("The specified queue does not exist")
    }
}

impl BackendFactory for FakeEmulator {
    fn storage(&self, _conn: &ConnectionParameters) -> Arc<dyn StorageBackend> {
        self.inner.clients.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }

    fn queues(&self, _conn: &ConnectionParameters) -> Arc<dyn QueueBackend> {
        self.inner.clients.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }

    fn topics(&self, _conn: &ConnectionParameters) -> Arc<dyn TopicBackend> {
        self.inner.clients.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }

    fn identity(&self, _conn: &ConnectionParameters) -> Arc<dyn IdentityBackend> {
        self.inner.clients.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }
}

#[async_trait]
impl StorageBackend for FakeEmulator {
    async fn list_buckets(&self) -> BackendResult<Vec<BucketSummary>> {
        self.record("list_buckets")?;
        let store = self.inner.store.lock().unwrap();
        Ok(store
            .buckets
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: ts(1_600_000_000),
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> BackendResult<()> {
        self.record("create_bucket")?;
        self.inner
            .store
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> BackendResult<()> {
        self.record("delete_bucket")?;
        let mut store = self.inner.store.lock().unwrap();
        match store.buckets.get(bucket) {
            None => Err(Self::no_bucket(bucket)),
            Some(objects) if !objects.is_empty() => Err(AppError::unclassified(
                "The bucket you tried to delete is not empty",
            )),
            Some(_) => {
                store.buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn list_objects(&self, bucket: &str) -> BackendResult<Vec<ObjectRecord>> {
        self.record("list_objects")?;
        let store = self.inner.store.lock().unwrap();
        let objects = store.buckets.get(bucket).ok_or_else(|| Self::no_bucket(bucket))?;
        Ok(objects.values().map(|(record, _)| record.clone()).collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _content_type: Option<String>,
        body: Bytes,
    ) -> BackendResult<()> {
        self.record("put_object")?;
        let mut store = self.inner.store.lock().unwrap();
        let objects = store
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_bucket(bucket))?;
        let record = ObjectRecord {
            key: key.to_string(),
            size: body.len() as u64,
            last_modified: ts(1_700_000_000),
            storage_class: None,
        };
        objects.insert(key.to_string(), (record, body));
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> BackendResult<ObjectDownload> {
        self.record("get_object")?;
        let body = self
            .object_body(bucket, key)
            .ok_or_else(|| AppError::not_found("The specified key does not exist."))?;
        Ok(ObjectDownload {
            content_type: Some("text/plain".into()),
            content_length: Some(body.len() as u64),
            e_tag: Some("\"etag\"".into()),
            last_modified: Some(ts(1_700_000_000)),
            body: Box::pin(std::io::Cursor::new(body.to_vec())),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.record("delete_object")?;
        if self.inner.failing_deletes.lock().unwrap().contains(key) {
            return Err(AppError::access_denied("Access Denied"));
        }
        let mut store = self.inner.store.lock().unwrap();
        if let Some(objects) = store.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> BackendResult<String> {
        self.record("presign_get_object")?;
        Ok(format!(
            "http://localhost:4566/{bucket}/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        _content_type: Option<String>,
    ) -> BackendResult<String> {
        self.record("create_multipart_upload")?;
        let upload_id = format!("upload-{bucket}-{key}");
        self.inner
            .store
            .lock()
            .unwrap()
            .uploads
            .insert(upload_id.clone(), Vec::new());
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> BackendResult<UploadedPart> {
        self.record("upload_part")?;
        let mut store = self.inner.store.lock().unwrap();
        let parts = store
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| AppError::not_found("The specified upload does not exist."))?;
        parts.push((part_number, body));
        Ok(UploadedPart {
            part_number,
            e_tag: format!("\"part-{part_number}\""),
        })
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> BackendResult<()> {
        self.record("complete_multipart_upload")?;
        let body = {
            let mut store = self.inner.store.lock().unwrap();
            let mut uploaded = store
                .uploads
                .remove(upload_id)
                .ok_or_else(|| AppError::not_found("The specified upload does not exist."))?;
            assert_eq!(uploaded.len(), parts.len());
            uploaded.sort_by_key(|(number, _)| *number);
            uploaded
                .into_iter()
                .flat_map(|(_, body)| body.to_vec())
                .collect::<Vec<u8>>()
        };
        let size = body.len() as u64;
        let mut store = self.inner.store.lock().unwrap();
        let objects = store
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_bucket(bucket))?;
        let record = ObjectRecord {
            key: key.to_string(),
            size,
            last_modified: ts(1_700_000_000),
            storage_class: None,
        };
        objects.insert(key.to_string(), (record, Bytes::from(body)));
        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
    ) -> BackendResult<()> {
        self.record("abort_multipart_upload")?;
        self.inner.store.lock().unwrap().uploads.remove(upload_id);
        Ok(())
    }

    async fn get_bucket_versioning(&self, _bucket: &str) -> BackendResult<Option<String>> {
        self.record("get_bucket_versioning")?;
        Ok(Some("Enabled".into()))
    }

    async fn put_bucket_versioning(&self, _bucket: &str, _status: &str) -> BackendResult<()> {
        self.record("put_bucket_versioning")
    }

    async fn get_bucket_encryption(&self, _bucket: &str) -> BackendResult<EncryptionSettings> {
        self.record("get_bucket_encryption")?;
        Err(AppError::not_found(
            "The server side encryption configuration was not found",
        ))
    }

    async fn put_bucket_encryption(
        &self,
        _bucket: &str,
        _settings: &EncryptionSettings,
    ) -> BackendResult<()> {
        self.record("put_bucket_encryption")
    }

    async fn get_bucket_cors(&self, _bucket: &str) -> BackendResult<Vec<CorsRule>> {
        self.record("get_bucket_cors")?;
        Ok(Vec::new())
    }

    async fn put_bucket_cors(&self, _bucket: &str, _rules: &[CorsRule]) -> BackendResult<()> {
        self.record("put_bucket_cors")?;
        Err(AppError::access_denied("Access Denied"))
    }

    async fn get_bucket_tagging(&self, _bucket: &str) -> BackendResult<Vec<Tag>> {
        self.record("get_bucket_tagging")?;
        Ok(vec![Tag::new("team", "storage")])
    }

    async fn put_bucket_tagging(&self, _bucket: &str, _tags: &[Tag]) -> BackendResult<()> {
        self.record("put_bucket_tagging")
    }

    async fn get_bucket_accelerate(&self, _bucket: &str) -> BackendResult<Option<String>> {
        self.record("get_bucket_accelerate")?;
        Ok(None)
    }

    async fn put_bucket_accelerate(&self, _bucket: &str, _status: &str) -> BackendResult<()> {
        self.record("put_bucket_accelerate")
    }
}

#[async_trait]
impl QueueBackend for FakeEmulator {
    async fn list_queues(&self) -> BackendResult<Vec<String>> {
        self.record("list_queues")?;
        Ok(self.inner.store.lock().unwrap().queues.keys().cloned().collect())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        self.record("get_queue_attributes")?;
        let store = self.inner.store.lock().unwrap();
        let messages = store.queues.get(queue_url).ok_or_else(Self::no_queue)?;
        Ok(BTreeMap::from([(
            "ApproximateNumberOfMessages".to_string(),
            messages.len().to_string(),
        )]))
    }

    async fn list_queue_tags(&self, _queue_url: &str) -> BackendResult<BTreeMap<String, String>> {
        self.record("list_queue_tags")?;
        Ok(BTreeMap::new())
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        _attributes: BTreeMap<String, String>,
    ) -> BackendResult<String> {
        self.record("create_queue")?;
        let url = format!("http://localhost:4566/{ACCOUNT_ID}/{queue_name}");
        self.inner
            .store
            .lock()
            .unwrap()
            .queues
            .entry(url.clone())
            .or_default();
        Ok(url)
    }

    async fn delete_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.record("delete_queue")?;
        self.inner
            .store
            .lock()
            .unwrap()
            .queues
            .remove(queue_url)
            .map(|_| ())
            .ok_or_else(Self::no_queue)
    }

    async fn purge_queue(&self, queue_url: &str) -> BackendResult<()> {
        self.record("purge_queue")?;
        let mut store = self.inner.store.lock().unwrap();
        store
            .queues
            .get_mut(queue_url)
            .ok_or_else(Self::no_queue)?
            .clear();
        Ok(())
    }

    async fn set_queue_attributes(
        &self,
        _queue_url: &str,
        _attributes: BTreeMap<String, String>,
    ) -> BackendResult<()> {
        self.record("set_queue_attributes")
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> BackendResult<String> {
        self.record("send_message")?;
        let mut store = self.inner.store.lock().unwrap();
        let messages = store.queues.get_mut(queue_url).ok_or_else(Self::no_queue)?;
        let message_id = format!("msg-{}", messages.len() + 1);
        messages.push(QueueMessage {
            message_id: message_id.clone(),
            receipt_handle: format!("rh-{message_id}"),
            body: body.to_string(),
            md5_of_body: None,
            attributes: BTreeMap::new(),
            message_attributes: BTreeMap::new(),
        });
        Ok(message_id)
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        _wait_seconds: i32,
    ) -> BackendResult<Vec<QueueMessage>> {
        self.record("receive_messages")?;
        let store = self.inner.store.lock().unwrap();
        let messages = store.queues.get(queue_url).ok_or_else(Self::no_queue)?;
        Ok(messages
            .iter()
            .take(max_messages.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> BackendResult<()> {
        self.record("delete_message")?;
        let mut store = self.inner.store.lock().unwrap();
        let messages = store.queues.get_mut(queue_url).ok_or_else(Self::no_queue)?;
        messages.retain(|m| m.receipt_handle != receipt_handle);
        Ok(())
    }
}

#[async_trait]
impl TopicBackend for FakeEmulator {
    async fn list_topics(&self) -> BackendResult<Vec<String>> {
        self.record("list_topics")?;
        Ok(self.inner.store.lock().unwrap().topics.keys().cloned().collect())
    }

    async fn create_topic(&self, name: &str) -> BackendResult<String> {
        self.record("create_topic")?;
        let arn = format!("arn:aws:sns:us-east-1:{ACCOUNT_ID}:{name}");
        self.inner
            .store
            .lock()
            .unwrap()
            .topics
            .entry(arn.clone())
            .or_default();
        Ok(arn)
    }

    async fn delete_topic(&self, topic_arn: &str) -> BackendResult<()> {
        self.record("delete_topic")?;
        self.inner.store.lock().unwrap().topics.remove(topic_arn);
        Ok(())
    }

    async fn get_topic_attributes(
        &self,
        topic_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        self.record("get_topic_attributes")?;
        Ok(BTreeMap::from([(
            "TopicArn".to_string(),
            topic_arn.to_string(),
        )]))
    }

    async fn set_topic_attribute(
        &self,
        _topic_arn: &str,
        name: &str,
        _value: &str,
    ) -> BackendResult<()> {
        self.record(&format!("set_topic_attribute:{name}"))
    }

    async fn list_tags(&self, resource_arn: &str) -> BackendResult<Vec<Tag>> {
        self.record("list_tags")?;
        let store = self.inner.store.lock().unwrap();
        Ok(store.topics.get(resource_arn).cloned().unwrap_or_default())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: &[Tag]) -> BackendResult<()> {
        self.record("tag_resource")?;
        let mut store = self.inner.store.lock().unwrap();
        let existing = store.topics.entry(resource_arn.to_string()).or_default();
        for tag in tags {
            existing.retain(|t| t.key != tag.key);
            existing.push(tag.clone());
        }
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, keys: &[String]) -> BackendResult<()> {
        self.record("untag_resource")?;
        let mut store = self.inner.store.lock().unwrap();
        if let Some(existing) = store.topics.get_mut(resource_arn) {
            existing.retain(|t| !keys.contains(&t.key));
        }
        Ok(())
    }

    async fn list_subscriptions(&self, topic_arn: &str) -> BackendResult<Vec<Subscription>> {
        self.record("list_subscriptions")?;
        Ok(vec![Subscription {
            subscription_arn: Some(format!("{topic_arn}:sub-1")),
            protocol: Some("sqs".into()),
            endpoint: Some(format!("arn:aws:sqs:us-east-1:{ACCOUNT_ID}:orders")),
            owner: Some(ACCOUNT_ID.into()),
            topic_arn: Some(topic_arn.to_string()),
        }])
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        _protocol: &str,
        _endpoint: &str,
    ) -> BackendResult<Option<String>> {
        self.record("subscribe")?;
        Ok(Some(format!("{topic_arn}:sub-1")))
    }

    async fn unsubscribe(&self, _subscription_arn: &str) -> BackendResult<()> {
        self.record("unsubscribe")
    }

    async fn get_subscription_attributes(
        &self,
        subscription_arn: &str,
    ) -> BackendResult<BTreeMap<String, String>> {
        self.record("get_subscription_attributes")?;
        Ok(BTreeMap::from([(
            "SubscriptionArn".to_string(),
            subscription_arn.to_string(),
        )]))
    }

    async fn set_subscription_attribute(
        &self,
        _subscription_arn: &str,
        name: &str,
        _value: &str,
    ) -> BackendResult<()> {
        self.record(&format!("set_subscription_attribute:{name}"))
    }

    async fn publish(
        &self,
        _topic_arn: &str,
        _message: &str,
        _subject: Option<&str>,
        _attributes: &BTreeMap<String, MessageAttribute>,
    ) -> BackendResult<Option<String>> {
        self.record("publish")?;
        Ok(Some("published-1".into()))
    }
}

#[async_trait]
impl IdentityBackend for FakeEmulator {
    async fn list_users(&self) -> BackendResult<Vec<IamUser>> {
        self.record("list_users")?;
        Ok(self.inner.store.lock().unwrap().users.clone())
    }

    async fn create_user(&self, user_name: &str) -> BackendResult<Option<IamUser>> {
        self.record("create_user")?;
        let user = IamUser {
            user_name: user_name.to_string(),
            user_id: format!("AIDA{}", user_name.to_uppercase()),
            arn: format!("arn:aws:iam::{ACCOUNT_ID}:user/{user_name}"),
            path: "/".into(),
            create_date: ts(1_700_000_000),
        };
        self.inner.store.lock().unwrap().users.push(user.clone());
        Ok(Some(user))
    }

    async fn delete_user(&self, user_name: &str) -> BackendResult<()> {
        self.record("delete_user")?;
        let mut store = self.inner.store.lock().unwrap();
        let before = store.users.len();
        store.users.retain(|u| u.user_name != user_name);
        if store.users.len() == before {
            return Err(AppError::not_found(format!(
                "The user with name {user_name} cannot be found."
            )));
        }
        Ok(())
    }

    async fn list_roles(&self) -> BackendResult<Vec<IamRole>> {
        self.record("list_roles")?;
        Ok(Vec::new())
    }

    async fn create_role(
        &self,
        role_name: &str,
        assume_role_policy_document: &str,
        description: Option<&str>,
    ) -> BackendResult<Option<IamRole>> {
        self.record("create_role")?;
        Ok(Some(IamRole {
            role_name: role_name.to_string(),
            role_id: "AROA1".into(),
            arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/{role_name}"),
            path: "/".into(),
            create_date: ts(1_700_000_000),
            description: description.map(str::to_string),
            assume_role_policy_document: Some(assume_role_policy_document.to_string()),
        }))
    }

    async fn delete_role(&self, _role_name: &str) -> BackendResult<()> {
        self.record("delete_role")
    }

    async fn list_policies(&self) -> BackendResult<Vec<IamPolicy>> {
        self.record("list_policies")?;
        Ok(self.inner.store.lock().unwrap().policies.clone())
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        _policy_document: &str,
    ) -> BackendResult<Option<IamPolicy>> {
        self.record("create_policy")?;
        let policy = IamPolicy {
            policy_name: policy_name.to_string(),
            arn: Some(format!("arn:aws:iam::{ACCOUNT_ID}:policy/{policy_name}")),
            ..IamPolicy::default()
        };
        self.inner.store.lock().unwrap().policies.push(policy.clone());
        Ok(Some(policy))
    }

    async fn delete_policy(&self, policy_arn: &str) -> BackendResult<()> {
        self.record(&format!("delete_policy:{policy_arn}"))
    }
}
