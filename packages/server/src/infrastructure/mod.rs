//! Infrastructure layer: concrete implementations of the domain seams.

pub mod dto;
pub mod registry;
pub mod security;
pub mod websocket;

pub use registry::InMemoryUserRegistry;
pub use security::{BcryptPasswordVerifier, OsRandomTokenGenerator};
pub use websocket::{WebSocketFrameSink, WebSocketFrameSource, split_socket};
