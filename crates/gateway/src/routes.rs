use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::auth::extract_token;
use crate::state::AppState;
use crate::ws_connection::serve_socket;

#[derive(Debug, Deserialize)]
struct WsQuery {
    token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// WebSocket 升级入口。凭证无效时直接拒绝升级，不携带任何载荷。
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<Response, StatusCode> {
    let Some(token) = extract_token(&headers, query.token.as_deref()) else {
        tracing::debug!("WebSocket upgrade rejected: missing credential");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user = state.verifier.verify(token).map_err(|_| {
        tracing::debug!("WebSocket upgrade rejected: invalid credential");
        StatusCode::UNAUTHORIZED
    })?;

    Ok(ws.on_upgrade(move |socket| serve_socket(socket, state, user)))
}
