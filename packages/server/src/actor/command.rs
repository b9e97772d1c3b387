//! Message types for actor communication.
//!
//! Request-reply commands carry a `oneshot::Sender` that the actor answers
//! exactly once.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::domain::{AuthError, AuthToken, ChatMessage, HistoryError, HistoryPage, UserIdentity};

/// Commands handled by the auth actor
#[derive(Debug)]
pub enum AuthCommand {
    /// Verify the room password and mint a token for `user`
    CreateToken {
        password: String,
        user: Arc<UserIdentity>,
        respond_to: oneshot::Sender<Result<AuthToken, AuthError>>,
    },

    /// Look up a token without consuming it
    CheckToken {
        token: AuthToken,
        respond_to: oneshot::Sender<Option<Arc<UserIdentity>>>,
    },

    /// Look up a token and delete it on a valid hit
    ConsumeToken {
        token: AuthToken,
        respond_to: oneshot::Sender<Option<Arc<UserIdentity>>>,
    },
}

/// Commands handled by the message actor
#[derive(Debug)]
pub enum MessageCommand {
    /// Broadcast and append. Fire-and-forget: there is no reply.
    NewMessage { message: ChatMessage },

    /// Serialized history page (`-1` = newest)
    GetMessages {
        page: i64,
        respond_to: oneshot::Sender<Result<HistoryPage, HistoryError>>,
    },
}
