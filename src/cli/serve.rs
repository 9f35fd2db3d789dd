use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api;
use crate::cli::commands::{GlobalArgs, ServeArgs};
use crate::cli::context::CliContext;
use crate::client::{GenerationBackend, TemplateCatalog};
use crate::errors::ReportError;
use crate::session::SessionManager;
use tracing::info;

pub async fn handle_serve(global: &GlobalArgs, args: ServeArgs) -> Result<(), ReportError> {
    let ctx = CliContext::load(global).await?;
    let catalog: Arc<dyn TemplateCatalog> = ctx.client.clone();
    let backend: Arc<dyn GenerationBackend> = ctx.client.clone();

    let state = api::create_app_state(catalog, backend, &ctx.config);
    spawn_session_reaper(Arc::clone(&state.sessions), ctx.config.session_ttl());
    let app = api::build_router(state).layer(api::cors_layer(&ctx.config.cors_origins()));

    let addr = ctx.config.server_addr(args.host.as_deref(), args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, auth = std::env::var(api::auth::API_TOKEN_ENV).is_ok(), "Report bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(|e| ReportError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Periodically drop sessions whose UI went away without a DELETE.
fn spawn_session_reaper(sessions: Arc<SessionManager>, ttl: Duration) {
    let period = ttl.min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sessions.reap_idle(ttl, Instant::now()).await;
        }
    });
    info!(ttl_secs = ttl.as_secs(), "Idle session reaping enabled");
}
