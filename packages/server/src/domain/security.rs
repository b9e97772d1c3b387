//! Seams for the password check and token randomness.

use super::{error::TokenGenerationError, token::AuthToken};

/// Checks a candidate against the stored room password hash
#[cfg_attr(test, mockall::automock)]
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, candidate: &str) -> bool;
}

/// Mints fresh, unguessable tokens
#[cfg_attr(test, mockall::automock)]
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Result<AuthToken, TokenGenerationError>;
}
