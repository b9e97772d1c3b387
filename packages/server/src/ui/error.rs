//! Mapping from usecase errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::usecase::{AuthorizeError, GetHistoryError, LoginError, LogoutError};

/// An HTTP failure: status plus a short plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str),
    Unauthorized(&'static str),
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::BadRequest(m) | Self::Unauthorized(m) | Self::Internal(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidUserName(_) => Self::BadRequest("Invalid user name"),
            LoginError::InvalidPassword => Self::Unauthorized("Invalid password"),
            LoginError::Internal(e) => {
                tracing::error!(error = %e, "Login failed");
                Self::Internal("Server error")
            }
        }
    }
}

impl From<AuthorizeError> for ApiError {
    fn from(err: AuthorizeError) -> Self {
        match err {
            AuthorizeError::Unauthorized => Self::Unauthorized("Invalid token"),
            AuthorizeError::Unavailable(e) => {
                tracing::error!(error = %e, "Token check failed");
                Self::Internal("server error")
            }
        }
    }
}

impl From<GetHistoryError> for ApiError {
    fn from(err: GetHistoryError) -> Self {
        match err {
            GetHistoryError::Unauthorized => Self::Unauthorized("unauthorized"),
            GetHistoryError::BadRequest(_) => Self::BadRequest("bad request"),
            GetHistoryError::Internal(e) => {
                tracing::error!(error = %e, "History read failed");
                Self::Internal("server error")
            }
        }
    }
}

impl From<LogoutError> for ApiError {
    fn from(err: LogoutError) -> Self {
        match err {
            LogoutError::Unauthorized => Self::Unauthorized("unauthorized"),
            LogoutError::Internal(e) => {
                tracing::error!(error = %e, "Logout failed");
                Self::Internal("server error")
            }
        }
    }
}
