//! UseCase 層: ユーザー操作ごとのアプリケーションロジック
//!
//! 各ユースケースは actor のハンドルと domain の trait だけに依存し、
//! HTTP や WebSocket の詳細は ui / infrastructure 層に閉じ込める。

pub mod chat_session;
pub mod error;
pub mod get_history;
pub mod join_room;
pub mod login;
pub mod logout;

pub use chat_session::ChatSessionUseCase;
pub use error::{AuthorizeError, GetHistoryError, LoginError, LogoutError};
pub use get_history::GetHistoryUseCase;
pub use join_room::JoinRoomUseCase;
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
