//! Connected-user registry seam.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::user::{SessionId, UserIdentity};

/// Serialized bytes pushed to a session. Every recipient of a broadcast gets
/// a clone of the same allocation.
pub type Payload = Arc<str>;

/// Bounded FIFO of payloads waiting to be written to one session
pub type DeliveryQueue = mpsc::Sender<Payload>;

/// A live session as seen by fan-out
#[derive(Debug, Clone)]
pub struct ConnectedUser {
    pub session_id: SessionId,
    pub user: Arc<UserIdentity>,
    pub queue: DeliveryQueue,
}

/// Set of currently connected users.
///
/// Membership is the sole criterion for broadcast fan-out. Implementations
/// keep their critical sections short and never hold a lock across an await.
pub trait UserRegistry: Send + Sync {
    /// Register a session. Re-adding the same session id replaces the entry.
    fn add_user(&self, user: ConnectedUser);

    /// Returns `true` if the session was registered
    fn remove_user(&self, session_id: &SessionId) -> bool;

    /// Point-in-time copy of the membership, used as the fan-out target list
    fn snapshot(&self) -> Vec<ConnectedUser>;

    fn count(&self) -> usize;
}
