//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::ValidationError;

/// ログイン処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("invalid user name: {0}")]
    InvalidUserName(#[from] ValidationError),

    #[error("invalid password")]
    InvalidPassword,

    #[error("login failed: {0}")]
    Internal(String),
}

/// トークン検証（/join）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    /// 未知・期限切れ・使用済みのトークン
    #[error("unauthorized")]
    Unauthorized,

    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetHistoryError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("page {0} is out of range")]
    BadRequest(i64),

    #[error("history unavailable: {0}")]
    Internal(String),
}

/// ログアウト処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogoutError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("logout failed: {0}")]
    Internal(String),
}
