//! Domain layer: chat entities, the token table, bucketed history and the
//! trait seams the actors and sessions are written against.
//!
//! Nothing here spawns tasks or touches the network. The token table and the
//! history are plain single-owner structures; the actors give them their
//! concurrency story.

pub mod connection;
pub mod error;
pub mod history;
pub mod message;
pub mod registry;
pub mod security;
pub mod token;
pub mod user;

pub use connection::{FrameSink, FrameSource, InboundFrame};
pub use error::{
    AuthError, ConnectionError, HistoryError, SubmitError, TokenGenerationError, ValidationError,
};
pub use history::{BUCKET_CAPACITY, History, HistoryPage, MessageBucket, NEWEST_PAGE, NO_MORE_PAGES};
pub use message::{ChatMessage, ErrorNotice, MAX_BODY_CHARS, MessageBody};
pub use registry::{ConnectedUser, DeliveryQueue, Payload, UserRegistry};
pub use security::{PasswordVerifier, TokenGenerator};
pub use token::{AuthToken, TOKEN_BYTES, TokenEntry, TokenStore};
pub use user::{MAX_USER_NAME_CHARS, SessionId, UserIdentity, UserName};
