use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use regscope_core::catalog::{
    CatalogSummary, ContentSearch, ContentSearchResults, KeywordProvider, KeywordSuggestions,
    QueryPlan, SummaryOptions,
};
use regscope_core::research::{MemorySummary, Visualization, WorkflowStep};
use regscope_core::{Extract, ExtractFilter, Keyword, NewSummary, RegscopeError, Storage, Summary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/extracts", get(list_extracts))
        .route("/api/extracts/search", get(search_extracts))
        .route("/api/extracts/filter", post(filter_extracts))
        .route("/api/extracts/{id}", get(get_extract))
        .route("/api/keywords", get(list_keywords))
        .route("/api/keywords/{category}", get(keywords_by_category))
        .route("/api/summaries", post(create_summary))
        .route("/api/summaries/{id}", get(get_summary))
        .route("/api/mcp/query-gen", post(query_gen))
        .route("/api/mcp/content-search", post(content_search))
        .route("/api/mcp/keywords-gen", post(keywords_gen))
        .route("/api/mcp/summary", post(summary))
        .route("/api/ai/chat", post(chat))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_extracts(State(state): State<AppState>) -> Result<Json<Vec<Extract>>, ApiError> {
    let extracts = state
        .services
        .storage
        .all_extracts()
        .await
        .map_err(|e| internal(e, "Failed to fetch extracts"))?;
    Ok(Json(extracts))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_extracts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Extract>>, ApiError> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| bad_request("Query parameter 'q' is required"))?;
    let extracts = state
        .services
        .storage
        .search_extracts(&query)
        .await
        .map_err(|e| internal(e, "Failed to search extracts"))?;
    Ok(Json(extracts))
}

async fn filter_extracts(
    State(state): State<AppState>,
    payload: Result<Json<ExtractFilter>, JsonRejection>,
) -> Result<Json<Vec<Extract>>, ApiError> {
    let Json(filter) = payload.map_err(|_| bad_request("Invalid filter data"))?;
    let extracts = state
        .services
        .storage
        .filter_extracts(&filter)
        .await
        .map_err(|e| internal(e, "Failed to filter extracts"))?;
    Ok(Json(extracts))
}

async fn get_extract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Extract>, ApiError> {
    let id: u32 = id.parse().map_err(|_| bad_request("Invalid extract ID"))?;
    state
        .services
        .storage
        .extract_by_id(id)
        .await
        .map_err(|e| internal(e, "Failed to fetch extract"))?
        .map(Json)
        .ok_or_else(|| not_found("Extract not found"))
}

async fn list_keywords(State(state): State<AppState>) -> Result<Json<Vec<Keyword>>, ApiError> {
    let keywords = state
        .services
        .storage
        .all_keywords()
        .await
        .map_err(|e| internal(e, "Failed to fetch keywords"))?;
    Ok(Json(keywords))
}

async fn keywords_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Keyword>>, ApiError> {
    let keywords = state
        .services
        .storage
        .keywords_by_category(&category)
        .await
        .map_err(|e| internal(e, "Failed to fetch keywords by category"))?;
    Ok(Json(keywords))
}

async fn create_summary(
    State(state): State<AppState>,
    payload: Result<Json<NewSummary>, JsonRejection>,
) -> Result<Json<Summary>, ApiError> {
    let summary = match payload {
        Ok(Json(summary)) if summary.is_valid() => summary,
        _ => return Err(bad_request("Invalid summary data")),
    };
    let summary = state
        .services
        .storage
        .create_summary(summary)
        .await
        .map_err(|e| internal(e, "Failed to create summary"))?;
    Ok(Json(summary))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Summary>, ApiError> {
    let id: u32 = id.parse().map_err(|_| bad_request("Invalid summary ID"))?;
    state
        .services
        .storage
        .summary_by_id(id)
        .await
        .map_err(|e| internal(e, "Failed to fetch summary"))?
        .map(Json)
        .ok_or_else(|| not_found("Summary not found"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryGenRequest {
    user_query: String,
    #[serde(default)]
    context: Option<String>,
}

async fn query_gen(
    State(state): State<AppState>,
    payload: Result<Json<QueryGenRequest>, JsonRejection>,
) -> Result<Json<QueryPlan>, ApiError> {
    let Json(request) = payload.map_err(|_| bad_request("userQuery is required"))?;
    let plan = state
        .services
        .catalog
        .query_gen(&request.user_query, request.context.as_deref());
    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
struct ContentSearchRequest {
    query: String,
    #[serde(default)]
    filters: Option<Value>,
}

async fn content_search(
    State(state): State<AppState>,
    payload: Result<Json<ContentSearchRequest>, JsonRejection>,
) -> Result<Json<ContentSearchResults>, ApiError> {
    let Json(request) = payload.map_err(|_| bad_request("query is required"))?;
    let results = state
        .services
        .catalog
        .content_search(&request.query, request.filters.as_ref())
        .await
        .map_err(|e| internal(e, "Content search failed"))?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct KeywordsGenRequest {
    content: String,
    #[serde(default)]
    category: Option<String>,
}

async fn keywords_gen(
    State(state): State<AppState>,
    payload: Result<Json<KeywordsGenRequest>, JsonRejection>,
) -> Result<Json<KeywordSuggestions>, ApiError> {
    let Json(request) = payload.map_err(|_| bad_request("content is required"))?;
    let suggestions = state
        .services
        .catalog
        .keywords_gen(&request.content, request.category.as_deref())
        .await
        .map_err(|e| internal(e, "Keyword generation failed"))?;
    Ok(Json(suggestions))
}

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    content: Vec<String>,
    #[serde(default)]
    options: SummaryOptions,
}

async fn summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<CatalogSummary>, ApiError> {
    let Json(request) = payload.map_err(|_| bad_request("content must be a list of strings"))?;
    Ok(Json(
        state
            .services
            .catalog
            .summary(&request.content, &request.options),
    ))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    workflow: WorkflowReport,
}

#[derive(Debug, Serialize)]
struct WorkflowReport {
    steps: Vec<WorkflowStep>,
    visualizations: Vec<Visualization>,
    memory: MemorySummary,
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload
        .ok()
        .and_then(|Json(request)| request.message)
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| bad_request("Message is required"))?;

    let outcome = state
        .services
        .workflow
        .process_question(&message, None)
        .await
        .map_err(|e| internal(e, "Failed to process AI request"))?;

    Ok(Json(ChatResponse {
        response: outcome.answer,
        workflow: WorkflowReport {
            memory: outcome.memory.summary(),
            steps: outcome.steps,
            visualizations: outcome.visualizations,
        },
    }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: String,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_code: String,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

fn bad_request(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message)
}

fn not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

/// Log the cause and answer with a generic message
fn internal(err: RegscopeError, message: &str) -> ApiError {
    tracing::error!(error = %err, "{}", message);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.error_code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
