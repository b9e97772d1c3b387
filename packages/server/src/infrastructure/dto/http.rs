//! Request and response bodies for the HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

/// Response of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Query string of `GET /join`
#[derive(Debug, Clone, Deserialize)]
pub struct JoinQuery {
    pub token: Option<String>,
}

/// Response of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
