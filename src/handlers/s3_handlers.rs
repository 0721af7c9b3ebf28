//! HTTP handlers for bucket and object operations.
//! Object bodies are streamed back to the caller; uploads with progress are
//! reported as server-sent events.

use axum::{
    body::Body,
    extract::{
        Multipart, Path, Query, State, multipart::MultipartRejection, rejection::JsonRejection,
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::ReaderStream;

use super::{json_body, required, required_raw};
use crate::{
    errors::AppError,
    models::{
        bucket::{BucketAttributes, BucketAttributesUpdate, BucketSummary},
        connection::{ConnectionParameters, ConnectionQuery},
        envelope::ApiResponse,
        object::{ObjectDownload, ObjectRecord, file_name},
        tree::TreeNode,
    },
    services::storage_service::UploadFile,
    state::AppState,
};

/// Identifiers accepted in the query string of object calls.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectQuery {
    pub bucket_name: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub bucket_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttributesReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub bucket_name: Option<String>,
    pub attributes: Option<BucketAttributesUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrl {
    pub download_url: String,
}

/// GET `/api/s3/buckets`
pub async fn list_buckets(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<BucketSummary>>, AppError> {
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let buckets = storage.list_buckets().await?;
    let message = format!("Successfully loaded {} buckets", buckets.len());
    Ok(ApiResponse::ok(buckets, message))
}

/// POST `/api/s3/buckets`
pub async fn create_bucket(
    State(state): State<AppState>,
    body: Result<axum::Json<CreateBucketReq>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = json_body(body)?;
    let bucket = required(req.bucket_name.as_deref(), "Bucket name")?;
    let storage = state.storage(&req.config)?;
    storage.create_bucket(&bucket).await?;
    Ok(ApiResponse::done(format!(
        "Successfully created bucket \"{bucket}\""
    )))
}

/// DELETE `/api/s3/buckets`, removing every object first.
pub async fn delete_bucket(
    State(state): State<AppState>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let bucket = required(ids.bucket_name.as_deref(), "Bucket name")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    storage.delete_bucket_cascade(&bucket).await?;
    Ok(ApiResponse::done(format!(
        "Successfully deleted bucket \"{bucket}\""
    )))
}

/// GET `/api/s3/buckets/attributes`
pub async fn get_bucket_attributes(
    State(state): State<AppState>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<BucketAttributes>, AppError> {
    let bucket = required(ids.bucket_name.as_deref(), "Bucket name")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let attributes = storage.bucket_attributes(&bucket).await;
    Ok(ApiResponse::ok(
        attributes,
        "Successfully retrieved bucket attributes",
    ))
}

/// PUT `/api/s3/buckets/attributes`
pub async fn update_bucket_attributes(
    State(state): State<AppState>,
    body: Result<axum::Json<UpdateAttributesReq>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = json_body(body)?;
    let bucket = required(req.bucket_name.as_deref(), "Bucket name")?;
    let update = match req.attributes {
        Some(update) if !update.is_empty() => update,
        _ => return Err(AppError::validation("At least one attribute is required")),
    };
    let storage = state.storage(&req.config)?;
    let results = storage.update_bucket_attributes(&bucket, &update).await;
    Ok(ApiResponse::done(format!(
        "Successfully updated bucket attributes: {}",
        results.join(", ")
    )))
}

/// GET `/api/s3/objects`
pub async fn list_objects(
    State(state): State<AppState>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<ObjectRecord>>, AppError> {
    list_objects_in(state, ids.bucket_name, conn).await
}

/// GET `/api/s3/{bucket}/objects`
pub async fn list_bucket_objects(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<ObjectRecord>>, AppError> {
    list_objects_in(state, Some(bucket), conn).await
}

async fn list_objects_in(
    state: AppState,
    bucket: Option<String>,
    conn: ConnectionQuery,
) -> Result<ApiResponse<Vec<ObjectRecord>>, AppError> {
    let bucket = required(bucket.as_deref(), "Bucket name")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let objects = storage.list_objects(&bucket).await?;
    let message = format!(
        "Successfully loaded {} objects from {bucket}",
        objects.len()
    );
    Ok(ApiResponse::ok(objects, message))
}

/// GET `/api/s3/{bucket}/tree`: the listing folded into folders by `/`.
pub async fn object_tree(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<TreeNode>>, AppError> {
    let bucket = required(Some(bucket.as_str()), "Bucket name")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let (count, tree) = storage.object_tree(&bucket).await?;
    Ok(ApiResponse::ok(
        tree,
        format!("Successfully loaded {count} objects from {bucket}"),
    ))
}

/// POST `/api/s3/objects` (multipart form).
pub async fn upload_object(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let form = read_upload_form(multipart).await?;
    upload_form(state, form, None).await
}

/// POST `/api/s3/{bucket}/objects` and `/api/s3/{bucket}/upload`.
pub async fn upload_bucket_object(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let form = read_upload_form(multipart).await?;
    upload_form(state, form, Some(bucket)).await
}

async fn upload_form(
    state: AppState,
    form: UploadForm,
    path_bucket: Option<String>,
) -> Result<ApiResponse<()>, AppError> {
    let (file, bucket, key, conn) = form.into_parts(path_bucket)?;
    let storage = state.storage(&conn)?;
    let file_name = file.file_name.clone();
    storage.put_object(&bucket, &key, file).await?;
    Ok(ApiResponse::done(format!(
        "Successfully uploaded \"{file_name}\" to {bucket}"
    )))
}

/// POST `/api/s3/upload`: upload with progress as server-sent events.
///
/// Validation failures are answered with a plain error envelope; once the
/// stream starts every outcome is reported as an event.
pub async fn upload_with_progress(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let form = read_upload_form(multipart).await?;
    let (file, bucket, key, conn) = form.into_parts(None)?;
    let storage = state.storage(&conn)?;

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        storage.upload_with_progress(&bucket, &key, file, tx).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(event));
    let mut response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

/// DELETE `/api/s3/objects`
pub async fn delete_object(
    State(state): State<AppState>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    delete_object_in(state, ids.bucket_name, ids.key, conn).await
}

/// DELETE `/api/s3/{bucket}/objects`
pub async fn delete_bucket_object(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    delete_object_in(state, Some(bucket), ids.key, conn).await
}

async fn delete_object_in(
    state: AppState,
    bucket: Option<String>,
    key: Option<String>,
    conn: ConnectionQuery,
) -> Result<ApiResponse<()>, AppError> {
    let bucket = required(bucket.as_deref(), "Bucket name")?;
    let key = required_raw(key.as_deref(), "Object key")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    storage.delete_object(&bucket, &key).await?;
    Ok(ApiResponse::done(format!("Successfully deleted \"{key}\"")))
}

/// GET `/api/s3/download`: presigned URL for a direct download.
pub async fn presigned_download(
    State(state): State<AppState>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<DownloadUrl>, AppError> {
    let bucket = required(ids.bucket_name.as_deref(), "Bucket name")?;
    let key = required_raw(ids.key.as_deref(), "Object key")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let download_url = storage.presigned_download_url(&bucket, &key).await?;
    Ok(ApiResponse::ok(
        DownloadUrl { download_url },
        format!("Download URL generated for \"{key}\""),
    ))
}

/// GET `/api/s3/{bucket}/download`: the object body as an attachment.
pub async fn download_object(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(ids): Query<ObjectQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<Response, AppError> {
    let key = required_raw(ids.key.as_deref(), "Object key")?;
    let storage = state.storage(&ConnectionParameters::from(conn))?;
    let download = storage.download(&bucket, &key).await?;

    let mut headers = HeaderMap::new();
    set_download_headers(&mut headers, &download, &key);
    let body = download.body;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(body)));
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = headers;
    Ok(response)
}

/// `attachment` disposition for `name`. Quotes and backslashes are escaped;
/// a name outside printable ASCII also gets an RFC 5987 `filename*`.
fn content_disposition(name: &str) -> String {
    let mut fallback = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                fallback.push('\\');
                fallback.push(c);
            }
            ' '..='~' => fallback.push(c),
            _ => fallback.push('_'),
        }
    }
    if name.chars().all(|c| matches!(c, ' '..='~')) {
        return format!("attachment; filename=\"{fallback}\"");
    }

    let encoded: String = name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect();
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

fn set_download_headers(headers: &mut HeaderMap, download: &ObjectDownload, key: &str) {
    let content_type = download
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    if let Some(length) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    let disposition = content_disposition(file_name(key));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    if let Some(modified) = download.last_modified {
        let http_date = modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&http_date) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }

    if let Some(etag) = download.e_tag.as_deref() {
        if let Ok(value) = HeaderValue::from_str(etag) {
            headers.insert(header::ETAG, value);
        }
    }
}

/// Fields of an upload form; connection fields travel alongside the file.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadFile>,
    bucket_name: Option<String>,
    key: Option<String>,
    conn: ConnectionQuery,
}

impl UploadForm {
    /// Check file, bucket and key in that order. A bucket taken from the
    /// path wins over a form field.
    fn into_parts(
        self,
        path_bucket: Option<String>,
    ) -> Result<(UploadFile, String, String, ConnectionParameters), AppError> {
        let file = self.file.ok_or_else(|| AppError::required("File"))?;
        let bucket = required(path_bucket.or(self.bucket_name).as_deref(), "Bucket name")?;
        let key = required_raw(self.key.as_deref(), "Object key")?;
        Ok((file, bucket, key, ConnectionParameters::from(self.conn)))
    }
}

async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, AppError> {
    let mut multipart = multipart.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let invalid = |err: axum::extract::multipart::MultipartError| {
        AppError::validation(format!("Invalid upload form: {}", err.body_text()))
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let body = field.bytes().await.map_err(invalid)?;
            form.file = Some(UploadFile {
                file_name,
                content_type,
                body,
            });
            continue;
        }

        let value = field.text().await.map_err(invalid)?;
        match name.as_str() {
            "bucketName" => form.bucket_name = Some(value),
            "key" => form.key = Some(value),
            "endpoint" => form.conn.endpoint = Some(value),
            "region" => form.conn.region = Some(value),
            "accessKey" => form.conn.access_key = Some(value),
            "secretKey" => form.conn.secret_key = Some(value),
            "forcePathStyle" => form.conn.force_path_style = Some(value),
            _ => {}
        }
    }
    Ok(form)
}
