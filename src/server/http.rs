//! HTTP handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::assistant;
use crate::completion::CompletionError;
use crate::server::ServerState;
use crate::types::{LessonMeta, Module, Project, ProjectStatus, Stat};

const INVALID_CONTEXT: &str = "Missing or invalid 'context' field.";
const OBJECTIVE_FAILED: &str = "Server error while generating objective output.";

/// Status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub objective_configured: bool,
}

/// Dashboard response
#[derive(Debug, Serialize)]
pub struct DashboardResponse<'a> {
    pub modules: &'a [Module],
    pub stats: &'a [Stat],
}

/// Project list filters
#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// Assistant request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub project_id: String,
    pub lesson_id: String,
    pub message: String,
}

/// Status handler
pub async fn status_handler(
    State(state): State<ServerState>,
) -> impl IntoResponse {
    let response = StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.completion.model.clone(),
        objective_configured: state.objective.is_some(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Dashboard modules and quick stats
pub async fn dashboard_handler(
    State(state): State<ServerState>,
) -> impl IntoResponse {
    let response = DashboardResponse {
        modules: state.catalog.modules(),
        stats: state.catalog.stats(),
    };
    (StatusCode::OK, Json(json!(response))).into_response()
}

/// Project list, optionally filtered by status and search text
pub async fn list_projects_handler(
    State(state): State<ServerState>,
    Query(query): Query<ProjectQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(raw) => match ProjectStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Unknown status '{}'", raw) }))
                ).into_response();
            }
        },
        None => None,
    };

    let projects: Vec<&Project> = state
        .catalog
        .search(query.q.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect();

    (StatusCode::OK, Json(json!({ "projects": projects }))).into_response()
}

/// Project detail
pub async fn project_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.catalog.project(&id) {
        Some(project) => (StatusCode::OK, Json(json!(project))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Project Not Found" }))
        ).into_response(),
    }
}

/// Objective proxy: `{context, meta?}` in, `{output}` out
pub async fn core_objective_handler(
    State(state): State<ServerState>,
    body: Bytes,
) -> impl IntoResponse {
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let context = match parsed.get("context").and_then(|c| c.as_str()) {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_CONTEXT }))).into_response();
        }
    };
    let meta: LessonMeta = parsed
        .get("meta")
        .cloned()
        .and_then(|m| serde_json::from_value(m).ok())
        .unwrap_or_default();

    let Some(source) = state.objective.as_ref() else {
        warn!("Objective request received but no provider key is configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": OBJECTIVE_FAILED }))).into_response();
    };

    info!(project = %meta.project_id, lesson = %meta.lesson_id, chars = context.chars().count(), "Objective request");

    match source.objective(&context, &meta).await {
        Ok(output) => (StatusCode::OK, Json(json!({ "output": output }))).into_response(),
        Err(e) => {
            log_provider_error(&e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": OBJECTIVE_FAILED }))).into_response()
        }
    }
}

fn log_provider_error(e: &CompletionError) {
    match e.status() {
        Some(status) => warn!(status, error = %e, "CORE objective provider error"),
        None => warn!(error = %e, "CORE objective request failed"),
    }
}

/// Lesson assistant reply
pub async fn assistant_handler(
    State(state): State<ServerState>,
    Json(req): Json<AssistantRequest>,
) -> impl IntoResponse {
    let Some(project) = state.catalog.project(&req.project_id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Project Not Found" }))).into_response();
    };
    let Some(lesson) = project.lesson(&req.lesson_id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Lesson Not Found" }))).into_response();
    };

    match assistant::reply(project, lesson, &req.message) {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message is empty" }))
        ).into_response(),
    }
}
