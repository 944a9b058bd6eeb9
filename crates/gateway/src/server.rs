use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use crate::{
    notify_routes::notify_handler, push_routes::push_router, state::AppState,
    webhook_routes::webhook_router,
};

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/webhook", webhook_router())
        .nest("/api/push", push_router())
        .route("/api/notify", post(notify_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "gymflow gateway listening");
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
