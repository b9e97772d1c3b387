//! Token table.
//!
//! A plain map with no synchronization of its own. It is owned by exactly one
//! auth actor, which is what makes "check expiry then delete" atomic.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};

use super::user::UserIdentity;

/// Bytes of entropy in a token (hex-encoded to twice as many characters)
pub const TOKEN_BYTES: usize = 32;

/// Opaque bearer credential.
///
/// Deliberately has no `Display` impl so it does not end up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Owner and absolute expiry of a token
#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub user: Arc<UserIdentity>,
    pub expires_at: DateTime<Utc>,
}

impl TokenEntry {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: HashMap<AuthToken, TokenEntry>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: AuthToken, user: Arc<UserIdentity>, expires_at: DateTime<Utc>) {
        self.tokens.insert(token, TokenEntry { user, expires_at });
    }

    /// Look up a token. An expired entry is deleted on the spot and reported
    /// as not found.
    pub fn check(&mut self, token: &AuthToken, now: DateTime<Utc>) -> Option<Arc<UserIdentity>> {
        let valid = self.tokens.get(token)?.is_valid_at(now);
        if valid {
            self.tokens.get(token).map(|entry| Arc::clone(&entry.user))
        } else {
            self.tokens.remove(token);
            None
        }
    }

    /// Like [`TokenStore::check`], but a valid hit is deleted as well.
    pub fn consume(&mut self, token: &AuthToken, now: DateTime<Utc>) -> Option<Arc<UserIdentity>> {
        let user = self.check(token, now)?;
        self.tokens.remove(token);
        Some(user)
    }

    /// Drop every entry that has expired by `now`. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, entry| entry.is_valid_at(now));
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
