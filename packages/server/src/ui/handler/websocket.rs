//! WebSocket connection handler for `GET /join`.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};

use crate::{
    domain::AuthToken,
    infrastructure::{dto::http::JoinQuery, split_socket},
    ui::{error::ApiError, state::AppState},
};

/// Check the token, then upgrade and hand the socket to a chat session.
///
/// Failure order: missing token (400), bad token (401), upgrade fault (500).
pub async fn join_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JoinQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let token = match query.token {
        Some(token) if !token.is_empty() => AuthToken::new(token),
        _ => return Err(ApiError::BadRequest("Missing token")),
    };

    let user = state.join_room_usecase.authorize(token).await?;

    let ws = ws.map_err(|rejection| {
        tracing::warn!(user_id = %user.id, error = %rejection, "WebSocket upgrade failed");
        ApiError::Internal("Websocket error")
    })?;

    let session = state.chat_session_usecase.clone();
    let write_timeout = state.write_timeout;
    Ok(ws
        .on_upgrade(move |socket| async move {
            let (source, sink) = split_socket(socket, write_timeout);
            session.run(user, source, sink).await;
        })
        .into_response())
}
