//! Chat message entity and the payloads pushed to sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{error::ValidationError, registry::Payload, user::UserIdentity};

/// Maximum message body length in characters
pub const MAX_BODY_CHARS: usize = 4000;

/// Text of a chat message. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(body: String) -> Result<Self, ValidationError> {
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyMessageBody);
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(ValidationError::MessageBodyTooLong {
                max: MAX_BODY_CHARS,
            });
        }
        Ok(Self(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A message as stored in history and broadcast to the room.
///
/// Immutable once created. The author is shared with the token table and the
/// registry rather than copied.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub user: Arc<UserIdentity>,
    pub time: DateTime<Utc>,
    pub body: MessageBody,
}

impl ChatMessage {
    pub fn new(user: Arc<UserIdentity>, time: DateTime<Utc>, body: MessageBody) -> Self {
        Self { user, time, body }
    }

    /// Serialize once into the payload shared by every recipient
    pub fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        serde_json::to_string(self).map(Payload::from)
    }
}

/// In-band error pushed to a session whose send attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub err: String,
}

impl ErrorNotice {
    pub fn new(err: impl Into<String>) -> Self {
        Self { err: err.into() }
    }

    pub fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        serde_json::to_string(self).map(Payload::from)
    }
}
