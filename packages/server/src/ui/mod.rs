//! HTTP and WebSocket surface of the chat relay.

mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ApiError;
pub use server::Server;
