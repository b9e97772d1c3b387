//! In-memory user registry.
//!
//! A `HashMap` behind a read-write lock. Writers (join/leave) hold the lock for
//! a single insert or remove; fan-out holds the read lock only long enough to
//! clone the membership, so the lock is never held across an await.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::domain::{ConnectedUser, SessionId, UserRegistry};

#[derive(Debug, Default)]
pub struct InMemoryUserRegistry {
    users: RwLock<HashMap<SessionId, ConnectedUser>>,
}

impl InMemoryUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRegistry for InMemoryUserRegistry {
    fn add_user(&self, user: ConnectedUser) {
        let session_id = user.session_id;
        let user_id = user.user.id;
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id, user);
        tracing::debug!(%session_id, %user_id, "User registered");
    }

    fn remove_user(&self, session_id: &SessionId) -> bool {
        let removed = self
            .users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some();
        if removed {
            tracing::debug!(%session_id, "User unregistered");
        }
        removed
    }

    fn snapshot(&self) -> Vec<ConnectedUser> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn count(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Payload, UserIdentity, UserName};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn connected(name: &str) -> (ConnectedUser, mpsc::Receiver<Payload>) {
        let (queue, rx) = mpsc::channel(4);
        let user = ConnectedUser {
            session_id: SessionId::generate(),
            user: Arc::new(UserIdentity::new(UserName::new(name.to_string()).unwrap())),
            queue,
        };
        (user, rx)
    }

    #[test]
    fn test_add_and_remove_user() {
        // テスト項目: 登録と削除が件数に反映される
        // given (前提条件):
        let registry = InMemoryUserRegistry::new();
        let (alice, _rx) = connected("alice");
        let session_id = alice.session_id;

        // when (操作):
        registry.add_user(alice);
        let after_add = registry.count();
        let removed = registry.remove_user(&session_id);

        // then (期待する結果):
        assert_eq!(after_add, 1);
        assert!(removed);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        // テスト項目: 2 回目の削除は false を返し、問題なく処理される
        // given (前提条件):
        let registry = InMemoryUserRegistry::new();
        let (alice, _rx) = connected("alice");
        let session_id = alice.session_id;
        registry.add_user(alice);

        // when (操作):
        let first = registry.remove_user(&session_id);
        let second = registry.remove_user(&session_id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        // テスト項目: スナップショットは取得時点のメンバーのみを含む
        // given (前提条件):
        let registry = InMemoryUserRegistry::new();
        let (alice, _rx1) = connected("alice");
        let (bob, _rx2) = connected("bob");
        registry.add_user(alice);

        // when (操作):
        let snapshot = registry.snapshot();
        registry.add_user(bob);

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].user.name.as_str(), "alice");
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_same_identity_in_two_sessions() {
        // テスト項目: 同じユーザーでもセッションが異なれば別々に登録される
        // given (前提条件):
        let registry = InMemoryUserRegistry::new();
        let (first, _rx1) = connected("alice");
        let (queue, _rx2) = mpsc::channel(4);
        let second = ConnectedUser {
            session_id: SessionId::generate(),
            user: first.user.clone(),
            queue,
        };

        // when (操作):
        registry.add_user(first);
        registry.add_user(second);

        // then (期待する結果):
        assert_eq!(registry.count(), 2);
    }
}
