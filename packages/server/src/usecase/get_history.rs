//! UseCase: 履歴取得
//!
//! トークンを CheckToken で検証してから、指定ページのバケットを返す。

use crate::{
    actor::{AuthActorHandle, MessageActorHandle},
    domain::{AuthToken, HistoryError, HistoryPage},
};

use super::error::GetHistoryError;

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    auth: AuthActorHandle,
    messages: MessageActorHandle,
}

impl GetHistoryUseCase {
    pub fn new(auth: AuthActorHandle, messages: MessageActorHandle) -> Self {
        Self { auth, messages }
    }

    /// 履歴ページを取得
    ///
    /// # Arguments
    ///
    /// * `token` - Bearer トークン
    /// * `page` - バケット ID（`-1` は最新）
    pub async fn execute(&self, token: AuthToken, page: i64) -> Result<HistoryPage, GetHistoryError> {
        match self.auth.check_token(token).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(GetHistoryError::Unauthorized),
            Err(e) => return Err(GetHistoryError::Internal(e.to_string())),
        }

        self.messages.get_messages(page).await.map_err(|e| match e {
            HistoryError::BadRequest { page, .. } => GetHistoryError::BadRequest(page),
            other => GetHistoryError::Internal(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::{AuthSettings, FanoutSettings},
        domain::{
            ChatMessage, MessageBody, UserIdentity, UserName,
            security::{MockPasswordVerifier, MockTokenGenerator},
        },
        infrastructure::InMemoryUserRegistry,
    };
    use chrono::Utc;
    use hearth_shared::time::SystemClock;
    use std::{sync::Arc, time::Duration};

    async fn create_usecase_with_token() -> (GetHistoryUseCase, MessageActorHandle, AuthToken) {
        let mut verifier = MockPasswordVerifier::new();
        verifier.expect_verify().returning(|_| true);
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .returning(|| Ok(AuthToken::new("c".repeat(64))));
        let auth = AuthActorHandle::spawn(
            Arc::new(verifier),
            Arc::new(generator),
            Arc::new(SystemClock),
            AuthSettings::default(),
        );
        let messages = MessageActorHandle::spawn(
            Arc::new(InMemoryUserRegistry::new()),
            FanoutSettings {
                delivery_timeout: Duration::from_millis(50),
                ..FanoutSettings::default()
            },
        );
        let user = Arc::new(UserIdentity::new(UserName::new("jonah".to_string()).unwrap()));
        let token = auth
            .create_token("look24".to_string(), user)
            .await
            .unwrap();
        (
            GetHistoryUseCase::new(auth, messages.clone()),
            messages,
            token,
        )
    }

    #[tokio::test]
    async fn test_get_newest_page() {
        // テスト項目: 有効なトークンで最新ページを取得できる
        // given (前提条件):
        let (usecase, messages, token) = create_usecase_with_token().await;
        let user = Arc::new(UserIdentity::new(UserName::new("ann".to_string()).unwrap()));
        let body = MessageBody::new("hello".to_string()).unwrap();
        messages
            .new_message(ChatMessage::new(user, Utc::now(), body))
            .await
            .unwrap();

        // when (操作):
        let page = usecase.execute(token, -1).await.unwrap();

        // then (期待する結果):
        assert_eq!(page.page, 0);
        assert!(page.payload.contains("\"hello\""));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        // テスト項目: 未発行のトークンでは取得できない
        // given (前提条件):
        let (usecase, _messages, _token) = create_usecase_with_token().await;

        // when (操作):
        let result = usecase.execute(AuthToken::new("d".repeat(64)), -1).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GetHistoryError::Unauthorized);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_bad_request() {
        // テスト項目: 範囲外のページは BadRequest になる
        // given (前提条件):
        let (usecase, _messages, token) = create_usecase_with_token().await;

        // when (操作):
        let above = usecase.execute(token.clone(), 1).await;
        let below = usecase.execute(token, -2).await;

        // then (期待する結果):
        assert_eq!(above.unwrap_err(), GetHistoryError::BadRequest(1));
        assert_eq!(below.unwrap_err(), GetHistoryError::BadRequest(-2));
    }
}
