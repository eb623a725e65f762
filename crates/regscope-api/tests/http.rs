use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use regscope_api::{routes, state::AppState};
use regscope_core::{
    ChatMessage, Config, LLMClient, MemStorage, RegscopeError, RegulatoryCatalog, Result, Services,
};

/// Replays canned completions; `None` entries fail the call
struct ScriptedClient {
    replies: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> Result<String> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(RegscopeError::ExternalError("provider unavailable".into())),
            None => Ok(String::new()),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn app_with(replies: Vec<Option<&str>>) -> Router {
    let services = Services::new(
        Config::default(),
        Arc::new(MemStorage::new()),
        Arc::new(RegulatoryCatalog::new()),
        Arc::new(ScriptedClient::new(replies)),
    );
    routes::router(AppState::new(Arc::new(services)))
}

fn app() -> Router {
    app_with(Vec::new())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is not JSON")
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_ok() {
    let (status, _) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lists_seeded_extracts() {
    let (status, body) = send(app(), get("/api/extracts")).await;
    assert_eq!(status, StatusCode::OK);
    let extracts = body.as_array().unwrap();
    assert_eq!(extracts.len(), 6);
    assert_eq!(extracts[0]["title"], "Basel III: Minimum Capital Requirements");
    assert!(extracts[0].get("relevanceScore").is_some());
}

#[tokio::test]
async fn search_requires_query() {
    let (status, body) = send(app(), get("/api/extracts/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Query parameter 'q' is required");
    assert_eq!(body["error_code"], "invalid_request");

    let (status, body) = send(app(), get("/api/extracts/search?q=TLAC")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn filter_by_priority() {
    let (status, body) = send(
        app(),
        post("/api/extracts/filter", json!({ "priorities": ["High Priority"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn extract_by_id() {
    let (status, body) = send(app(), get("/api/extracts/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (status, body) = send(app(), get("/api/extracts/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid extract ID");

    let (status, body) = send(app(), get("/api/extracts/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Extract not found");
}

#[tokio::test]
async fn keywords_by_category() {
    let (status, body) = send(app(), get("/api/keywords")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 12);

    let (_, body) = send(app(), get("/api/keywords/Capital")).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn summary_create_and_fetch() {
    let app = app();

    let (status, body) = send(
        app.clone(),
        post("/api/summaries", json!({ "title": "  ", "content": "text" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid summary data");

    let (status, body) = send(
        app.clone(),
        post(
            "/api/summaries",
            json!({ "title": "Capital stack", "content": "CET1 first", "extractIds": [1, 2] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["extractIds"], json!([1, 2]));

    let (status, body) = send(app.clone(), get("/api/summaries/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Capital stack");

    let (status, body) = send(app.clone(), get("/api/summaries/x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid summary ID");

    let (status, body) = send(app, get("/api/summaries/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Summary not found");
}

#[tokio::test]
async fn catalog_functions() {
    let (status, body) = send(
        app(),
        post("/api/mcp/query-gen", json!({ "userQuery": "liquidity risk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["originalQuery"], "liquidity risk");
    assert_eq!(body["generatedQueries"].as_array().unwrap().len(), 3);

    let (status, body) = send(
        app(),
        post("/api/mcp/content-search", json!({ "query": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 4);

    let (status, body) = send(
        app(),
        post("/api/mcp/keywords-gen", json!({ "content": "capital buffers" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "banking_regulation");
    assert!(!body["keywords"]["primary"].as_array().unwrap().is_empty());

    let (status, body) = send(
        app(),
        post("/api/mcp/summary", json!({ "content": ["a", "b"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputSources"], 2);
    assert_eq!(body["style"], "executive");
}

#[tokio::test]
async fn chat_requires_message() {
    let (status, body) = send(app(), post("/api/ai/chat", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Message is required");

    let (status, _) = send(app(), post("/api/ai/chat", json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_runs_research_workflow() {
    let app = app_with(vec![
        Some(r#"{"primary": ["tier 1"], "secondary": [], "generated": ["CET1"]}"#),
        Some(r#"{"score": 82, "coverage": 80, "relevance": 85, "completeness": 80, "recommendation": "proceed"}"#),
        Some("Banks must hold **4.5% CET1**."),
    ]);

    let (status, body) = send(
        app,
        post("/api/ai/chat", json!({ "message": "What are Basel III capital requirements?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Banks must hold **4.5% CET1**.");
    let workflow = &body["workflow"];
    assert_eq!(workflow["steps"].as_array().unwrap().len(), 4);
    assert_eq!(workflow["steps"][3]["status"], "completed");
    assert_eq!(workflow["visualizations"][0]["type"], "keywords");
    assert_eq!(workflow["memory"]["keywordsCount"], 1);
    assert_eq!(workflow["memory"]["qualityScore"], 82);
    assert_eq!(workflow["memory"]["attempts"], 1);
}

#[tokio::test]
async fn chat_hides_provider_failure() {
    let (status, body) = send(
        app_with(vec![None]),
        post("/api/ai/chat", json!({ "message": "What is LCR?" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to process AI request");
    assert!(!body.to_string().contains("provider unavailable"));
}
