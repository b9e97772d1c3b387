//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ChatSessionUseCase, GetHistoryUseCase, JoinRoomUseCase, LoginUseCase, LogoutUseCase,
};

pub struct AppState {
    /// LoginUseCase（ログインのユースケース）
    pub login_usecase: Arc<LoginUseCase>,
    /// JoinRoomUseCase（入室時のトークン検証）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// ChatSessionUseCase（接続中セッションの送受信）
    pub chat_session_usecase: Arc<ChatSessionUseCase>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
    /// LogoutUseCase（ログアウトのユースケース）
    pub logout_usecase: Arc<LogoutUseCase>,
    /// WebSocket 書き込みのタイムアウト
    pub write_timeout: Duration,
}
