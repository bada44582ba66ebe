#![forbid(unsafe_code)]

use super::framing::MAX_FRAME_BYTES;
use crate::McpServer;
use crate::support::jsonrpc::parse_request;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    server: Arc<McpServer>,
}

pub(crate) fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(mcp))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_FRAME_BYTES))
        .with_state(AppState { server })
}

/// Binds `host:port` and serves until Ctrl-C.
pub(crate) async fn run_http(server: Arc<McpServer>, host: IpAddr, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving MCP over HTTP");
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("http server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// One JSON-RPC message per POST. Notifications are acknowledged with an
/// empty 202; undecodable bodies get the JSON-RPC error with a 400.
async fn mcp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(reply) => return (StatusCode::BAD_REQUEST, Json(reply)).into_response(),
    };

    match state.server.handle(request, authorization).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
