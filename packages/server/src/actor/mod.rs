//! The two serialized workers that own all shared chat state.
//!
//! Each actor is a single task draining a bounded mailbox and handling one
//! command to completion before the next. Callers talk to it through a
//! cloneable handle; replies come back on a `oneshot` channel.
//!
//! - [`AuthActorHandle`]: password check, token minting, token lookup
//! - [`MessageActorHandle`]: history append, fan-out, paged history reads

mod auth;
mod command;
mod message;

pub use auth::{AuthActorHandle, AuthSettings};
pub use command::{AuthCommand, MessageCommand};
pub use message::{Delivery, FanoutSettings, MessageActorHandle};
