//! UseCase: 入室時のトークン検証
//!
//! `/join` のトークンを検証し、接続するユーザーを特定する。
//! トークンを使い捨てにするかどうかは [`JoinTokenPolicy`] で切り替える。

use std::sync::Arc;

use crate::{
    actor::AuthActorHandle,
    config::JoinTokenPolicy,
    domain::{AuthToken, UserIdentity},
};

use super::error::AuthorizeError;

/// 入室のユースケース
pub struct JoinRoomUseCase {
    auth: AuthActorHandle,
    policy: JoinTokenPolicy,
}

impl JoinRoomUseCase {
    pub fn new(auth: AuthActorHandle, policy: JoinTokenPolicy) -> Self {
        Self { auth, policy }
    }

    /// トークンの持ち主を返す
    ///
    /// `Reuse` なら CheckToken、`Consume` なら ConsumeToken で検証する。
    pub async fn authorize(&self, token: AuthToken) -> Result<Arc<UserIdentity>, AuthorizeError> {
        let result = match self.policy {
            JoinTokenPolicy::Reuse => self.auth.check_token(token).await,
            JoinTokenPolicy::Consume => self.auth.consume_token(token).await,
        };

        match result {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthorizeError::Unauthorized),
            Err(e) => Err(AuthorizeError::Unavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::AuthSettings,
        domain::{
            UserName,
            security::{MockPasswordVerifier, MockTokenGenerator},
        },
    };
    use hearth_shared::time::SystemClock;

    async fn create_usecase_with_token(policy: JoinTokenPolicy) -> (JoinRoomUseCase, AuthToken) {
        let mut verifier = MockPasswordVerifier::new();
        verifier.expect_verify().returning(|_| true);
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .returning(|| Ok(AuthToken::new("a".repeat(64))));
        let auth = AuthActorHandle::spawn(
            Arc::new(verifier),
            Arc::new(generator),
            Arc::new(SystemClock),
            AuthSettings::default(),
        );
        let user = Arc::new(UserIdentity::new(UserName::new("jonah".to_string()).unwrap()));
        let token = auth
            .create_token("look24".to_string(), user)
            .await
            .unwrap();
        (JoinRoomUseCase::new(auth, policy), token)
    }

    #[tokio::test]
    async fn test_reuse_policy_keeps_token_valid() {
        // テスト項目: Reuse ではトークンを何度でも使える
        // given (前提条件):
        let (usecase, token) = create_usecase_with_token(JoinTokenPolicy::Reuse).await;

        // when (操作):
        let first = usecase.authorize(token.clone()).await;
        let second = usecase.authorize(token).await;

        // then (期待する結果):
        assert_eq!(first.unwrap().name.as_str(), "jonah");
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_consume_policy_is_single_use() {
        // テスト項目: Consume ではトークンは 1 回しか使えない
        // given (前提条件):
        let (usecase, token) = create_usecase_with_token(JoinTokenPolicy::Consume).await;

        // when (操作):
        let first = usecase.authorize(token.clone()).await;
        let second = usecase.authorize(token).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), AuthorizeError::Unauthorized);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        // テスト項目: 未発行のトークンは Unauthorized になる
        // given (前提条件):
        let (usecase, _token) = create_usecase_with_token(JoinTokenPolicy::Reuse).await;

        // when (操作):
        let result = usecase.authorize(AuthToken::new("b".repeat(64))).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), AuthorizeError::Unauthorized);
    }
}
