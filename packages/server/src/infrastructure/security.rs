//! bcrypt password verification and OS-backed token generation.

use rand::{RngCore, rngs::OsRng};

use crate::domain::{AuthToken, PasswordVerifier, TOKEN_BYTES, TokenGenerationError, TokenGenerator};

/// Smallest and largest cost accepted by bcrypt
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Holds the bcrypt hash of the room password, computed once at startup.
pub struct BcryptPasswordVerifier {
    hash: String,
}

impl BcryptPasswordVerifier {
    /// Hash `password` with the given cost.
    ///
    /// # Errors
    ///
    /// Fails if the cost is outside `4..=31` or hashing fails. The server
    /// refuses to start in that case.
    pub fn new(password: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let hash = bcrypt::hash(password, cost)?;
        Ok(Self { hash })
    }
}

impl PasswordVerifier for BcryptPasswordVerifier {
    fn verify(&self, candidate: &str) -> bool {
        match bcrypt::verify(candidate, &self.hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Password verification failed");
                false
            }
        }
    }
}

/// Draws token bytes from the operating system's CSPRNG and hex-encodes them
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomTokenGenerator;

impl TokenGenerator for OsRandomTokenGenerator {
    fn generate(&self) -> Result<AuthToken, TokenGenerationError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenGenerationError(e.to_string()))?;
        Ok(AuthToken::new(hex::encode(bytes)))
    }
}
