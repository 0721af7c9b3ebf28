mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

use common::{FakeEmulator, conn_json, conn_query};
use emulator_console::{errors::AppError, services::aws::error::NETWORK_MESSAGE};

fn upload_form(bucket: Option<&str>, key: &str, file_name: &str, body: Vec<u8>) -> MultipartForm {
    let mut form = MultipartForm::new()
        .add_text("key", key)
        .add_text("endpoint", "http://localhost:4566")
        .add_text("region", "us-east-1")
        .add_text("accessKey", "test")
        .add_text("secretKey", "test")
        .add_text("forcePathStyle", "true")
        .add_part(
            "file",
            Part::bytes(body)
                .file_name(file_name)
                .mime_type("text/plain"),
        );
    if let Some(bucket) = bucket {
        form = form.add_text("bucketName", bucket);
    }
    form
}

/// `data:` payloads of a server-sent event stream.
fn sse_events(text: &str) -> Vec<Value> {
    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

#[tokio::test]
async fn missing_connection_never_builds_a_client() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let res = server.get("/api/s3/buckets").await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body, json!({"success": false, "error": "Endpoint is required"}));
    assert_eq!(fake.clients_built(), 0);
}

#[tokio::test]
async fn malformed_endpoint_is_rejected_before_any_call() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let mut config = conn_json();
    config["endpoint"] = json!("not-a-url");
    let res = server
        .post("/api/s3/buckets")
        .json(&json!({"config": config, "bucketName": "photos"}))
        .await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Invalid endpoint URL format");
    assert!(fake.calls().is_empty());
    assert_eq!(fake.clients_built(), 0);
}

#[tokio::test]
async fn missing_bucket_name_is_reported_first() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let res = server.delete("/api/s3/buckets").add_query_params(conn_query()).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Bucket name is required");
    assert_eq!(fake.clients_built(), 0);
}

#[tokio::test]
async fn malformed_json_body_gets_an_envelope() {
    let server = FakeEmulator::new().server();

    let res = server
        .post("/api/s3/buckets")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_then_list_buckets() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let res = server
        .post("/api/s3/buckets")
        .json(&json!({"config": conn_json(), "bucketName": "  photos "}))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>()["message"],
        "Successfully created bucket \"photos\""
    );

    let res = server.get("/api/s3/buckets").add_query_params(conn_query()).await;
    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["name"], "photos");
    assert!(body["data"][0]["creationDate"].is_string());
    assert_eq!(body["message"], "Successfully loaded 1 buckets");
}

#[tokio::test]
async fn bucket_delete_empties_the_bucket_first() {
    let fake = FakeEmulator::new()
        .with_object("photos", "a.txt", b"a")
        .with_object("photos", "b.txt", b"b");
    let server = fake.server();

    let res = server
        .delete("/api/s3/buckets")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(!fake.has_bucket("photos"));
    assert_eq!(
        fake.calls(),
        ["list_objects", "delete_object", "delete_object", "delete_bucket"]
    );
}

#[tokio::test]
async fn bucket_delete_continues_past_a_failed_object() {
    let fake = FakeEmulator::new()
        .with_object("photos", "a.txt", b"a")
        .with_object("photos", "b.txt", b"b")
        .with_object("photos", "c.txt", b"c")
        .failing_delete("b.txt");
    let server = fake.server();

    let res = server
        .delete("/api/s3/buckets")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        res.json::<Value>()["error"],
        "Failed to delete 1 object(s) from bucket \"photos\": \"b.txt\""
    );
    assert_eq!(
        fake.calls(),
        [
            "list_objects",
            "delete_object",
            "delete_object",
            "delete_object",
            "delete_bucket"
        ]
    );
    assert_eq!(fake.object_keys("photos"), ["b.txt"]);
}

#[tokio::test]
async fn bucket_delete_is_attempted_when_listing_fails() {
    let fake = FakeEmulator::new()
        .with_bucket("photos")
        .failing_call("list_objects", AppError::access_denied("Access Denied"));
    let server = fake.server();

    let res = server
        .delete("/api/s3/buckets")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>()["success"], true);
    assert_eq!(fake.calls(), ["list_objects", "delete_bucket"]);
    assert!(!fake.has_bucket("photos"));
}

#[tokio::test]
async fn bucket_delete_result_decides_when_listing_fails() {
    let fake = FakeEmulator::new()
        .with_object("photos", "a.txt", b"a")
        .failing_call("list_objects", AppError::access_denied("Access Denied"));
    let server = fake.server();

    let res = server
        .delete("/api/s3/buckets")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.json::<Value>()["error"],
        "The bucket you tried to delete is not empty"
    );
    assert_eq!(fake.calls(), ["list_objects", "delete_bucket"]);
    assert!(fake.has_bucket("photos"));
}

#[tokio::test]
async fn tree_folds_keys_into_folders() {
    let fake = FakeEmulator::new()
        .with_object("photos", "c.txt", b"ccc")
        .with_object("photos", "a/b.txt", b"bb");
    let server = fake.server();

    let res = server
        .get("/api/s3/photos/tree")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["message"], "Successfully loaded 2 objects from photos");

    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["type"], "folder");
    assert_eq!(roots[0]["name"], "a");
    assert_eq!(roots[0]["path"], "a");
    let child = &roots[0]["children"][0];
    assert_eq!(child["type"], "file");
    assert_eq!(child["name"], "b.txt");
    assert_eq!(child["path"], "a/b.txt");
    assert_eq!(child["size"], 2);
    assert_eq!(roots[1]["type"], "file");
    assert_eq!(roots[1]["name"], "c.txt");
}

#[tokio::test]
async fn list_objects_by_query_and_path() {
    let fake = FakeEmulator::new().with_object("photos", "cat.png", b"meow");
    let server = fake.server();

    let by_query = server
        .get("/api/s3/objects")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await
        .json::<Value>();
    let by_path = server
        .get("/api/s3/photos/objects")
        .add_query_params(conn_query())
        .await
        .json::<Value>();

    assert_eq!(by_query["data"], by_path["data"]);
    assert_eq!(by_query["data"][0]["key"], "cat.png");
    assert_eq!(by_query["data"][0]["size"], 4);
    assert_eq!(by_query["data"][0]["storageClass"], "STANDARD");
}

#[tokio::test]
async fn emulator_failures_map_to_statuses() {
    let cases = [
        (AppError::network(NETWORK_MESSAGE), StatusCode::BAD_GATEWAY),
        (AppError::not_found("NoSuchBucket"), StatusCode::NOT_FOUND),
        (AppError::access_denied("Access Denied"), StatusCode::FORBIDDEN),
        (
            AppError::invalid_credentials("Invalid credentials"),
            StatusCode::UNAUTHORIZED,
        ),
        (AppError::unclassified("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, status) in cases {
        let message = err.message.clone();
        let server = FakeEmulator::new().failing_with(err).server();
        let res = server.get("/api/s3/buckets").add_query_params(conn_query()).await;
        assert_eq!(res.status_code(), status);
        assert_eq!(res.json::<Value>(), json!({"success": false, "error": message}));
    }
}

#[tokio::test]
async fn upload_stores_the_file() {
    let fake = FakeEmulator::new().with_bucket("docs");
    let server = fake.server();

    let res = server
        .post("/api/s3/docs/objects")
        .multipart(upload_form(None, "notes/readme.md", "readme.md", b"# hi".to_vec()))
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>()["message"],
        "Successfully uploaded \"readme.md\" to docs"
    );
    assert_eq!(fake.object_body("docs", "notes/readme.md").unwrap(), "# hi");
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let form = MultipartForm::new()
        .add_text("bucketName", "docs")
        .add_text("key", "a.txt");
    let res = server.post("/api/s3/objects").multipart(form).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "File is required");
    assert_eq!(fake.clients_built(), 0);
}

#[tokio::test]
async fn progress_upload_ends_with_completion() {
    let fake = FakeEmulator::new().with_bucket("docs");
    let server = fake.server();

    let res = server
        .post("/api/s3/upload")
        .multipart(upload_form(Some("docs"), "a.txt", "a.txt", b"hello".to_vec()))
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("cache-control"), "no-cache");
    let events = sse_events(&res.text());
    assert_eq!(
        events,
        [
            json!({"type": "progress", "loaded": 5, "total": 5, "percentage": 100}),
            json!({
                "type": "complete",
                "success": true,
                "message": "Successfully uploaded \"a.txt\" to docs"
            }),
        ]
    );
}

#[tokio::test]
async fn large_progress_upload_goes_in_parts() {
    let fake = FakeEmulator::new().with_bucket("docs");
    let server = fake.server();
    let body = vec![7u8; 8 * 1024 * 1024 + 10];

    let res = server
        .post("/api/s3/upload")
        .multipart(upload_form(Some("docs"), "big.bin", "big.bin", body.clone()))
        .await;

    let events = sse_events(&res.text());
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], "progress");
    assert_eq!(events[0]["loaded"], 8 * 1024 * 1024);
    assert_eq!(events[1]["loaded"], body.len());
    assert_eq!(events[1]["percentage"], 100);
    assert_eq!(events[2]["type"], "complete");
    assert_eq!(fake.object_body("docs", "big.bin").unwrap().len(), body.len());
    assert!(fake.calls().contains(&"complete_multipart_upload".to_string()));
}

#[tokio::test]
async fn failed_multipart_completion_aborts_the_upload() {
    let fake = FakeEmulator::new().with_bucket("docs").failing_call(
        "complete_multipart_upload",
        AppError::unclassified("complete failed"),
    );
    let server = fake.server();
    let body = vec![7u8; 8 * 1024 * 1024 + 10];

    let res = server
        .post("/api/s3/upload")
        .multipart(upload_form(Some("docs"), "big.bin", "big.bin", body))
        .await;

    let events = sse_events(&res.text());
    let last = events.last().unwrap();
    assert_eq!(last["type"], "error");
    assert_eq!(last["error"], "complete failed");
    assert_eq!(
        fake.calls(),
        [
            "create_multipart_upload",
            "upload_part",
            "upload_part",
            "complete_multipart_upload",
            "abort_multipart_upload"
        ]
    );
    assert_eq!(fake.open_uploads(), 0);
    assert!(fake.object_body("docs", "big.bin").is_none());
}

#[tokio::test]
async fn failed_progress_upload_ends_with_error_event() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let res = server
        .post("/api/s3/upload")
        .multipart(upload_form(Some("missing"), "a.txt", "a.txt", b"x".to_vec()))
        .await;

    let events = sse_events(&res.text());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert_eq!(events[0]["success"], false);
}

#[tokio::test]
async fn download_streams_an_attachment() {
    let fake = FakeEmulator::new().with_object("photos", "2025/cat.txt", b"meow");
    let server = fake.server();

    let res = server
        .get("/api/s3/photos/download")
        .add_query_param("key", "2025/cat.txt")
        .add_query_params(conn_query())
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.text(), "meow");
    assert_eq!(
        res.header("content-disposition"),
        "attachment; filename=\"cat.txt\""
    );
    assert_eq!(res.header("content-type"), "text/plain");
}

#[tokio::test]
async fn presigned_url_lasts_an_hour() {
    let server = FakeEmulator::new().server();

    let res = server
        .get("/api/s3/download")
        .add_query_param("bucketName", "photos")
        .add_query_param("key", "cat.png")
        .add_query_params(conn_query())
        .await;

    let body: Value = res.json();
    let url = body["data"]["downloadUrl"].as_str().unwrap();
    assert!(url.ends_with("X-Amz-Expires=3600"));
}

#[tokio::test]
async fn delete_object_requires_a_key() {
    let fake = FakeEmulator::new().with_object("photos", "cat.png", b"x");
    let server = fake.server();

    let res = server
        .delete("/api/s3/photos/objects")
        .add_query_params(conn_query())
        .await;
    assert_eq!(res.json::<Value>()["error"], "Object key is required");

    let res = server
        .delete("/api/s3/photos/objects")
        .add_query_param("key", "cat.png")
        .add_query_params(conn_query())
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(fake.object_keys("photos").is_empty());
}

#[tokio::test]
async fn attributes_fall_back_when_unreadable() {
    let server = FakeEmulator::new().server();

    let res = server
        .get("/api/s3/buckets/attributes")
        .add_query_param("bucketName", "photos")
        .add_query_params(conn_query())
        .await;

    let data = &res.json::<Value>()["data"];
    assert_eq!(data["versioning"], "Enabled");
    assert_eq!(data["encryption"]["enabled"], false);
    assert_eq!(data["tags"], json!([{"Key": "team", "Value": "storage"}]));
    assert_eq!(data["transferAcceleration"], "Suspended");
}

#[tokio::test]
async fn attribute_updates_report_each_outcome() {
    let fake = FakeEmulator::new();
    let server = fake.server();

    let res = server
        .put("/api/s3/buckets/attributes")
        .json(&json!({
            "config": conn_json(),
            "bucketName": "photos",
            "attributes": {
                "versioning": "Enabled",
                "cors": [{"AllowedMethods": ["GET"], "AllowedOrigins": ["*"]}],
            },
        }))
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>()["message"],
        "Successfully updated bucket attributes: Versioning updated, Failed to update CORS"
    );

    let res = server
        .put("/api/s3/buckets/attributes")
        .json(&json!({"config": conn_json(), "bucketName": "photos", "attributes": {}}))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>()["error"],
        "At least one attribute is required"
    );
}
