use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use crate::api::models::{CheckResponse, SelectionPayload, SessionResponse};
use crate::api::AppState;
use crate::compat::Verdict;
use crate::dispatch::GenerationSession;
use crate::errors::ReportError;
use crate::session::SelectionState;
use tracing::info;

fn find_session(state: &AppState, id: &str) -> Result<Arc<GenerationSession>, ReportError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ReportError::NotFound(format!("Session {}", id)))
}

async fn resolve_selection(state: &AppState, payload: SelectionPayload) -> Result<SelectionState, ReportError> {
    let template = match payload.template_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(id) => Some(state.catalog.get(id).await?),
        None => None,
    };
    payload.into_selection(template, &state.defaults.options)
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create();
    let progress = session.snapshot().await;
    (StatusCode::CREATED, Json(SessionResponse { id: session.id().to_string(), progress }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ReportError> {
    let session = find_session(&state, &id)?;
    Ok(Json(SessionResponse { id, progress: session.snapshot().await }))
}

/// Inline verdict and the editable AI widgets for a selection. Never touches the generation endpoints.
pub async fn check_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectionPayload>,
) -> Result<Json<Value>, ReportError> {
    find_session(&state, &id)?;
    let selection = resolve_selection(&state, payload).await?;
    let verdict = selection
        .verdict()
        .unwrap_or_else(|| Verdict::Denied("Select a template to continue".into()));
    let body = CheckResponse::new(&verdict, selection.overrides());
    Ok(Json(serde_json::to_value(body)?))
}

pub async fn submit_generation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectionPayload>,
) -> Result<(StatusCode, Json<SessionResponse>), ReportError> {
    let session = find_session(&state, &id)?;
    let selection = resolve_selection(&state, payload).await?;
    let today = chrono::Local::now().date_naive();

    // The run continues in the background; progress is polled through GET.
    let _handle = session.submit(&selection, today).await?;
    info!(session = %id, "Generation submitted");
    Ok((StatusCode::ACCEPTED, Json(SessionResponse { id, progress: session.snapshot().await })))
}

pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ReportError> {
    let session = find_session(&state, &id)?;
    let closed = session.close().await;
    Ok(Json(json!({ "closed": closed, "progress": session.snapshot().await })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ReportError> {
    if state.sessions.remove(&id).await {
        Ok(Json(json!({ "deleted": true })))
    } else {
        Err(ReportError::NotFound(format!("Session {}", id)))
    }
}
