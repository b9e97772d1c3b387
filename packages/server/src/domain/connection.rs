//! Seams between a session and its physical connection.
//!
//! The WebSocket adapters live in `infrastructure::websocket`; tests drive
//! sessions through in-memory implementations.

use async_trait::async_trait;

use super::error::ConnectionError;

/// One unit of data sent by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Read half of a connection
#[async_trait]
pub trait FrameSource: Send {
    /// Next client-sent frame. A closed connection is reported as
    /// [`ConnectionError::Closed`].
    async fn next_frame(&mut self) -> Result<InboundFrame, ConnectionError>;
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    async fn send_frame(&mut self, payload: &str) -> Result<(), ConnectionError>;
}
