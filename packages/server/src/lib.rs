//! hearth: a single-room chat relay.
//!
//! Clients log in with a shared room password, join over WebSocket, and every
//! message is fanned out to everyone in the room and kept in a paged history.

pub mod actor;
pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
