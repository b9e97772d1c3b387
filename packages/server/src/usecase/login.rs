//! UseCase: ログイン処理
//!
//! ユーザー名を検証し、パスワードが部屋の共有パスワードと一致すれば
//! 24 時間有効なトークンを発行する。

use std::sync::Arc;

use crate::{
    actor::AuthActorHandle,
    domain::{AuthError, AuthToken, UserIdentity, UserName},
};

use super::error::LoginError;

/// ログインのユースケース
pub struct LoginUseCase {
    auth: AuthActorHandle,
}

impl LoginUseCase {
    pub fn new(auth: AuthActorHandle) -> Self {
        Self { auth }
    }

    /// ログインを実行
    ///
    /// # Returns
    ///
    /// * `Ok(AuthToken)` - 発行されたトークン
    /// * `Err(LoginError)` - ユーザー名不正、パスワード不一致、内部エラー
    pub async fn execute(&self, name: String, password: String) -> Result<AuthToken, LoginError> {
        let name = UserName::new(name)?;
        let user = Arc::new(UserIdentity::new(name));

        match self.auth.create_token(password, user.clone()).await {
            Ok(token) => {
                tracing::info!(user_id = %user.id, user = user.name.as_str(), "User logged in");
                Ok(token)
            }
            Err(AuthError::InvalidPassword) => Err(LoginError::InvalidPassword),
            Err(e) => Err(LoginError::Internal(e.to_string())),
        }
    }
}
