use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === SNAPSHOT ROUTES ===
        .route("/api/snapshot", post(handlers::create_snapshot))
        .route("/api/status", get(handlers::get_status))
        .route("/api/broadcasts", get(handlers::get_broadcasts))
        .route("/api/operator-commands", get(handlers::get_operator_commands))
        .route("/api/direct-messages", get(handlers::get_direct_messages))
        // === PARTICIPANT ROUTES ===
        .route(
            "/api/participants/{name}/join",
            post(handlers::join_participant),
        )
        .route(
            "/api/participants/{name}/leave",
            post(handlers::leave_participant),
        )
        .route(
            "/api/participants/{name}/sleep",
            post(handlers::sleep_participant),
        )
        .route(
            "/api/participants/{name}/wake",
            post(handlers::wake_participant),
        )
        .route(
            "/api/participants/{name}/position",
            get(handlers::announce_position).put(handlers::update_position),
        )
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
