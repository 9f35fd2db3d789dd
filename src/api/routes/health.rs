use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let counts = state.sessions.counts().await;
    Json(json!({
        "status": "healthy",
        "service": "reportctl",
        "version": env!("CARGO_PKG_VERSION"),
        "build": option_env!("GIT_HASH"),
        "builtAt": option_env!("BUILD_TIMESTAMP"),
        "sessions": counts.total,
        "inFlight": counts.in_flight,
    }))
}
