pub mod auth;
pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::client::{GenerationBackend, TemplateCatalog};
use crate::config::ReportctlConfig;
use crate::errors::RetryConfig;
use crate::models::GenerationOptions;
use crate::session::SessionManager;
use tracing::warn;

/// Values applied when a request leaves them out.
#[derive(Debug, Clone, Default)]
pub struct BridgeDefaults {
    pub category: Option<String>,
    pub options: GenerationOptions,
    pub retry: RetryConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TemplateCatalog>,
    pub sessions: Arc<SessionManager>,
    pub defaults: Arc<BridgeDefaults>,
}

pub fn create_app_state(
    catalog: Arc<dyn TemplateCatalog>,
    backend: Arc<dyn GenerationBackend>,
    config: &ReportctlConfig,
) -> AppState {
    AppState {
        catalog,
        sessions: Arc::new(SessionManager::new(backend)),
        defaults: Arc::new(BridgeDefaults {
            category: config.default_category(),
            options: config.generation_options(),
            retry: config.retry_config(),
        }),
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/templates", get(routes::templates::list_templates))
        .route("/api/sessions", post(routes::sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(routes::sessions::get_session).delete(routes::sessions::delete_session),
        )
        .route("/api/sessions/:id/check", post(routes::sessions::check_selection))
        .route("/api/sessions/:id/submit", post(routes::sessions::submit_generation))
        .route("/api/sessions/:id/close", post(routes::sessions::close_session))
        .route_layer(middleware::from_fn(auth::api_auth_middleware));

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the UI origins; an empty list or `*` allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
