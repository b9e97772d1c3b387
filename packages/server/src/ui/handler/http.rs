//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{AuthToken, NEWEST_PAGE},
    infrastructure::dto::http::{HealthResponse, LoginRequest, LoginResponse},
    ui::{error::ApiError, state::AppState},
};

/// Query parameters for `GET /history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// `POST /login`: exchange a user name and the room password for a token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected login body");
        ApiError::BadRequest("Bad request body")
    })?;

    let token = state
        .login_usecase
        .execute(request.user, request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: token.into_string(),
    }))
}

/// `GET /history?page=N`: one serialized history bucket
pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(query.page.as_deref())?;
    let token = bearer_token(&headers)?;

    let page = state.get_history_usecase.execute(token, page).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        page.payload.to_string(),
    ))
}

/// `GET|POST /logout`: invalidate the presented token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<&'static str, ApiError> {
    let token = bearer_token(&headers)?;
    state.logout_usecase.execute(token).await?;
    Ok("OK")
}

/// Missing or empty `page` means the newest bucket.
fn parse_page(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw {
        None | Some("") => Ok(NEWEST_PAGE),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest("invalid page parameter")),
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<AuthToken, ApiError> {
    let invalid = ApiError::BadRequest("invalid header format");
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| invalid.clone())?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Ok(AuthToken::new(token.to_string())),
        _ => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_page() {
        // テスト項目: page パラメータの解釈
        // then (期待する結果):
        assert_eq!(parse_page(None), Ok(-1));
        assert_eq!(parse_page(Some("")), Ok(-1));
        assert_eq!(parse_page(Some("3")), Ok(3));
        assert_eq!(parse_page(Some("-5")), Ok(-5));
        assert_eq!(
            parse_page(Some("abc")),
            Err(ApiError::BadRequest("invalid page parameter"))
        );
    }

    #[test]
    fn test_bearer_token() {
        // テスト項目: Authorization ヘッダーの解釈
        // given (前提条件):
        let invalid = Err(ApiError::BadRequest("invalid header format"));

        // then (期待する結果):
        assert_eq!(
            bearer_token(&headers_with("Bearer abc123")),
            Ok(AuthToken::new("abc123".to_string()))
        );
        assert_eq!(bearer_token(&HeaderMap::new()), invalid);
        assert_eq!(bearer_token(&headers_with("Bearer ")), invalid);
        assert_eq!(bearer_token(&headers_with("Basic abc123")), invalid);
        assert_eq!(bearer_token(&headers_with("abc123")), invalid);
    }
}
