//! Handler tests for the proofreading server
//!
//! The model client is stubbed; the relay talks to a throwaway provider on an
//! ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pretty_assertions::assert_eq;
use proofread_engine::client::{ModelClient, ModelRequest};
use proofread_engine::config::{ModelConfig, ProofreadConfig};
use proofread_engine::{HttpModelClient, ModelError, Proofreader};
use serde_json::{json, Value};
use shared_pdf::PdfTextExtractor;

use crate::{build_router, AppState};

struct StubClient {
    reply: Result<String, ModelError>,
}

#[async_trait]
impl ModelClient for StubClient {
    async fn complete(&self, _request: &ModelRequest) -> Result<String, ModelError> {
        self.reply.clone()
    }
}

fn state_with(reply: Result<String, ModelError>, relay_endpoint: Option<String>) -> AppState {
    let config = ProofreadConfig::default();
    let mut relay_config = ModelConfig::default();
    if let Some(endpoint) = relay_endpoint {
        relay_config.endpoint = endpoint;
    }

    AppState {
        extractor: Arc::new(PdfTextExtractor::new(config.input.max_pdf_bytes)),
        relay: Arc::new(HttpModelClient::new(relay_config).unwrap()),
        proofreader: Arc::new(Proofreader::new(Arc::new(StubClient { reply }), config)),
    }
}

fn server(reply: Result<String, ModelError>) -> TestServer {
    TestServer::new(build_router(state_with(reply, None))).unwrap()
}

fn proofread_body(text: &str) -> Value {
    json!({
        "text": text,
        "api_key": "sk-test",
        "context": {
            "years": "2025",
            "document_type": "Newsletter"
        }
    })
}

const TEXT: &str = "Our member club has a great staff.";

#[tokio::test]
async fn test_health() {
    let response = server(Ok("No errors found.".into())).get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "proofread-server");
}

#[tokio::test]
async fn test_proofread_merges_rule_and_model_findings() {
    let server = server(Ok(
        "- Paragraph 1 > \"great\" should be \"wonderful\" | EXPLAIN: tone".into(),
    ));
    let response = server.post("/api/proofread").json(&proofread_body(TEXT)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["partial"], false);
    assert_eq!(body["count"], 3);
    assert_eq!(body["summary"], "3 issues found");

    let kinds: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["capitalization", "style", "model_derived"]);
    assert_eq!(body["errors"][0]["correction_text"], "Member");

    let plain = body["export"]["plain_text"].as_str().unwrap();
    assert!(plain.starts_with("- Line 1 > \"member\" should be \"Member\"\n"));
    let csv = body["export"]["csv"].as_str().unwrap();
    assert!(csv.starts_with("Location,Error,Correction,Type,Explanation\n"));
}

#[tokio::test]
async fn test_clean_document() {
    let server = server(Ok("No errors found.".into()));
    let response = server
        .post("/api/proofread")
        .json(&proofread_body("Welcome, Members and Guests, to the Club."))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 0);
    assert_eq!(body["summary"], "No issues found");
}

#[tokio::test]
async fn test_year_range_context() {
    let server = server(Ok("No errors found.".into()));
    let mut request = proofread_body("Join us Tuesday, March 5 for the Member mixer.");
    request["context"]["years"] = json!("2024-2025");

    let response = server.post("/api/proofread").json(&request).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_short_text_is_bad_request() {
    let response = server(Ok("No errors found.".into()))
        .post("/api/proofread")
        .json(&proofread_body("hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_upstream_errors_map_to_statuses() {
    let cases = [
        (ModelError::Auth, StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
        (
            ModelError::RateLimited {
                retry_after_secs: Some(30),
            },
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
        ),
        (
            ModelError::Api {
                status: 500,
                message: "Internal server error".into(),
            },
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
        ),
    ];

    for (model_err, status, code) in cases {
        let response = server(Err(model_err))
            .post("/api/proofread")
            .json(&proofread_body(TEXT))
            .await;
        assert_eq!(response.status_code(), status);
        let body: Value = response.json();
        assert_eq!(body["code"], code);
    }
}

#[tokio::test]
async fn test_rate_limit_sets_retry_after() {
    let response = server(Err(ModelError::RateLimited {
        retry_after_secs: Some(30),
    }))
    .post("/api/proofread")
    .json(&proofread_body(TEXT))
    .await;

    assert_eq!(response.header("retry-after"), "30");
}

#[tokio::test]
async fn test_malformed_model_response_is_partial() {
    let response = server(Err(ModelError::MalformedResponse(
        "missing content[0].text".into(),
    )))
    .post("/api/proofread")
    .json(&proofread_body(TEXT))
    .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["partial"], true);
    assert_eq!(body["count"], 2);
    assert!(body["notice"].as_str().unwrap().contains("automated checks only"));
}

/// One-page PDF showing `text` in a standard font
fn build_pdf(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[tokio::test]
async fn test_pdf_proofread() {
    let server = server(Ok("No errors found.".into()));
    let pdf = build_pdf(TEXT);

    let response = server
        .post("/api/proofread/pdf")
        .json(&json!({
            "pdf_base64": STANDARD.encode(&pdf),
            "api_key": "sk-test",
            "context": {"years": "2025", "document_type": "Flyer"}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["extracted_text"],
        format!("Page 1:\n{}\n\n", TEXT)
    );
    assert_eq!(body["count"], 2);
    assert_eq!(body["errors"][0]["location"], "Line 2");
}

#[tokio::test]
async fn test_pdf_bad_input() {
    let server = server(Ok("No errors found.".into()));

    let response = server
        .post("/api/proofread/pdf")
        .json(&json!({
            "pdf_base64": "%%% not base64 %%%",
            "api_key": "sk-test",
            "context": {"years": "2025", "document_type": "Flyer"}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/proofread/pdf")
        .json(&json!({
            "pdf_base64": STANDARD.encode(b"plain text, not a pdf"),
            "api_key": "sk-test",
            "context": {"years": "2025", "document_type": "Flyer"}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid PDF"));
}

async fn provider(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["messages"][0]["content"] == "fail" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"type": "error", "error": {"type": "invalid_request_error", "message": "bad prompt"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"content": [{"type": "text", "text": "No errors found."}], "model": body["model"]})),
    )
}

async fn spawn_provider() -> SocketAddr {
    let app = Router::new().route("/v1/messages", post(provider));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_relay_passes_success_through() {
    let addr = spawn_provider().await;
    let state = state_with(
        Ok("unused".into()),
        Some(format!("http://{}/v1/messages", addr)),
    );
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .post("/api/relay")
        .json(&json!({"text": "Proofread this", "apiKey": "sk-test"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["content"][0]["text"], "No errors found.");
    assert_eq!(body["model"], "claude-3-haiku-20240307");
}

#[tokio::test]
async fn test_relay_wraps_provider_failure() {
    let addr = spawn_provider().await;
    let state = state_with(
        Ok("unused".into()),
        Some(format!("http://{}/v1/messages", addr)),
    );
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .post("/api/relay")
        .json(&json!({"text": "fail", "apiKey": "sk-test"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad prompt");
    assert_eq!(body["details"]["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_relay_transport_failure_is_function_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = state_with(
        Ok("unused".into()),
        Some(format!("http://{}/v1/messages", addr)),
    );
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .post("/api/relay")
        .json(&json!({"text": "Proofread this", "apiKey": "sk-test"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["type"], "function_error");
}
