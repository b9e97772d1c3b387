//! Utilities shared by the Hearth server binary and its tests.

pub mod logger;
pub mod time;
