//! UseCase: ログアウト
//!
//! ConsumeToken でトークンを失効させる。2 回目以降は Unauthorized。

use crate::{actor::AuthActorHandle, domain::AuthToken};

use super::error::LogoutError;

/// ログアウトのユースケース
pub struct LogoutUseCase {
    auth: AuthActorHandle,
}

impl LogoutUseCase {
    pub fn new(auth: AuthActorHandle) -> Self {
        Self { auth }
    }

    pub async fn execute(&self, token: AuthToken) -> Result<(), LogoutError> {
        match self.auth.consume_token(token).await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "User logged out");
                Ok(())
            }
            Ok(None) => Err(LogoutError::Unauthorized),
            Err(e) => Err(LogoutError::Internal(e.to_string())),
        }
    }
}
