//! Route handlers.

mod http;
mod websocket;

pub use http::{health_check, history, login, logout};
pub use websocket::join_handler;
