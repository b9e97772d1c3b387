//! User identity value objects.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::error::ValidationError;

/// Maximum display name length in characters
pub const MAX_USER_NAME_CHARS: usize = 64;

/// Display name chosen at login.
///
/// Stored trimmed. Must be non-empty and at most [`MAX_USER_NAME_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: String) -> Result<Self, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyUserName);
        }
        if trimmed.chars().count() > MAX_USER_NAME_CHARS {
            return Err(ValidationError::UserNameTooLong {
                max: MAX_USER_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Who a user is: a globally unique id plus a display name.
///
/// This is also the identity record sent as the first frame of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: UserName,
}

impl UserIdentity {
    /// Mint a new identity with a random id
    pub fn new(name: UserName) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// Identifies one live connection in the user registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
