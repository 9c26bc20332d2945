//! End-to-end tests driving the HTTP surface against a mocked AI service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use documind_gateway::{api, config, gateway::GatewayService};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tower::ServiceExt;

static INIT: OnceCell<()> = OnceCell::const_new();

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

/// Initialize shared environment, configuration, and AI service mocks exactly once,
/// then build a fresh gateway (own stores, own metrics) for the calling test.
async fn test_app() -> Router {
    INIT.get_or_init(|| async {
        let mock_server: &'static MockServer = Box::leak(Box::new(MockServer::start_async().await));

        let upload_dir = std::env::temp_dir().join(format!(
            "documind-gateway-test-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&upload_dir).expect("create upload dir");

        set_env("UPLOAD_DIR", upload_dir.to_str().expect("utf-8 path"));
        set_env("AI_SERVICE_URL", &mock_server.base_url());
        set_env("MAX_UPLOAD_BYTES", "4096");
        set_env("PROCESSING_CONCURRENCY", "2");
        config::init_config();

        // Text documents process successfully; PDFs simulate an AI-side failure.
        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/process-document")
                    .body_contains(".txt");
                then.status(200).json_body(json!({
                    "status": "success",
                    "chunkCount": 4,
                    "processingTime": 0.5,
                    "message": "Document processed successfully"
                }));
            })
            .await;
        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/process-document")
                    .body_contains(".pdf");
                then.status(500).body("text extraction failed");
            })
            .await;
        mock_server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(200).json_body(json!({
                    "answer": "The document is about Rust.",
                    "sources": [
                        {"page": 1, "snippet": "Rust is a systems language", "relevance": 0.9}
                    ],
                    "processingTime": 0.3,
                    "confidence": 0.85
                }));
            })
            .await;
    })
    .await;

    let service = GatewayService::new().expect("gateway service");
    api::create_router(Arc::new(service))
}

const BOUNDARY: &str = "documind-integration-boundary";

fn multipart_body(file_name: &str, content: &[u8], user_id: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
    if let Some(value) = user_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"userId\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &Router, file_name: &str, content: &[u8], user_id: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/documents/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file_name, content, user_id)))
        .expect("request");
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn wait_for_status(app: &Router, document_id: &str, target: &str) -> Value {
    for _ in 0..200 {
        let (status, json) = send(app, get(&format!("/api/documents/{document_id}"))).await;
        if status == StatusCode::OK && json["status"] == target {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("document {document_id} never reached status {target}");
}

#[tokio::test]
async fn upload_text_document_end_to_end() {
    let app = test_app().await;

    let content = "What is Rust? ".repeat(140);
    let (status, json) = upload(&app, "notes.txt", content.as_bytes(), Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "uploaded");
    let document_id = json["documentId"].as_str().expect("document id").to_string();
    assert!(document_id.starts_with("doc_"));

    let record = wait_for_status(&app, &document_id, "processed").await;
    assert_eq!(record["ownerId"], "alice");
    assert_eq!(record["fileType"], "text/plain");
    assert_eq!(record["originalFileName"], "notes.txt");

    let (status, listed) = send(&app, get("/api/documents/list?userId=alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed
        .as_array()
        .expect("array")
        .iter()
        .any(|doc| doc["id"] == document_id.as_str()));

    let query = Request::builder()
        .method(Method::POST)
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "documentId": document_id, "query": "What is this about?" }).to_string(),
        ))
        .expect("request");
    let (status, answer) = send(&app, query).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["answer"], "The document is about Rust.");
    assert!(answer["processingTime"].as_f64().expect("time") >= 0.0);
    assert_eq!(answer["sources"][0]["relevanceScore"], 0.9);

    let (status, metrics) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["queries_answered"], 1);
    assert_eq!(metrics["documents_processed"], 1);
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_a_record() {
    let app = test_app().await;

    // 6000 bytes of text against the 4096-byte test ceiling.
    let content = vec![b'a'; 6000];
    let (status, json) = upload(&app, "big.txt", &content, Some("bob")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("error").contains("size"));

    let (status, listed) = send(&app, get("/api/documents/list?userId=bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn disguised_binary_upload_is_rejected() {
    let app = test_app().await;

    let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x10];
    let (status, json) = upload(&app, "evil.txt", &png_magic, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("error").contains("file type"));
}

#[tokio::test]
async fn failed_processing_blocks_queries_with_conflict() {
    let app = test_app().await;

    let (status, json) = upload(&app, "report.pdf", b"%PDF-1.4\nminimal pdf body", None).await;
    assert_eq!(status, StatusCode::OK);
    let document_id = json["documentId"].as_str().expect("document id").to_string();

    wait_for_status(&app, &document_id, "failed").await;

    let query = Request::builder()
        .method(Method::POST)
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "documentId": document_id, "query": "Anything?" }).to_string(),
        ))
        .expect("request");
    let (status, body) = send(&app, query).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn delete_document_removes_it() {
    let app = test_app().await;

    let (status, json) = upload(&app, "todelete.txt", b"short lived document", None).await;
    assert_eq!(status, StatusCode::OK);
    let document_id = json["documentId"].as_str().expect("document id").to_string();
    wait_for_status(&app, &document_id, "processed").await;

    let delete = |id: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/documents/{id}"))
            .body(Body::empty())
            .expect("request")
    };

    let (status, _) = send(&app, delete(&document_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/documents/{document_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&document_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_document_yields_not_found() {
    let app = test_app().await;

    let (status, _) = send(&app, get("/api/documents/doc_does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let query = Request::builder()
        .method(Method::POST)
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "documentId": "doc_does_not_exist", "query": "Anything?" }).to_string(),
        ))
        .expect("request");
    let (status, _) = send(&app, query).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
