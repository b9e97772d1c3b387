//! Domain error types.

use thiserror::Error;

/// Value object validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user name must not be empty")]
    EmptyUserName,

    #[error("user name must be at most {max} characters")]
    UserNameTooLong { max: usize },

    #[error("message body must not be empty")]
    EmptyMessageBody,

    #[error("message body must be at most {max} characters")]
    MessageBodyTooLong { max: usize },
}

/// The randomness source could not produce a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token generation failed: {0}")]
pub struct TokenGenerationError(pub String);

/// Failures reported by the auth actor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The candidate password does not match the room password
    #[error("invalid password")]
    InvalidPassword,

    /// Token minting failed; the actor keeps running
    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    /// The password check could not run to completion
    #[error("password verification failed: {0}")]
    Verification(String),

    /// Issue time plus token lifetime does not fit in a timestamp
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,

    /// The actor mailbox or reply channel is gone
    #[error("auth actor unavailable: {0}")]
    Unavailable(String),
}

impl From<TokenGenerationError> for AuthError {
    fn from(err: TokenGenerationError) -> Self {
        Self::TokenGeneration(err.0)
    }
}

/// Failures reported by the message actor for history reads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Requested page is outside `-1..=tail`
    #[error("page {page} is out of range (newest page is {tail})")]
    BadRequest { page: i64, tail: u64 },

    #[error("failed to serialize history page: {0}")]
    Serialization(String),

    #[error("message actor unavailable: {0}")]
    Unavailable(String),
}

/// A message could not be handed to the message actor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message actor unavailable: {0}")]
pub struct SubmitError(pub String);

/// Physical connection faults. Any of these ends exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("write timed out")]
    Timeout,

    #[error("connection closed")]
    Closed,
}
