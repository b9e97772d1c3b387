//! Server configuration.
//!
//! Filled by the binary from command-line flags; tests build it directly.

use std::{fmt, time::Duration};

use chrono::Duration as ChronoDuration;

use crate::infrastructure::security::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// How `/join` treats the presented token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum JoinTokenPolicy {
    /// CheckToken: the token stays valid for `/history` and further joins
    #[default]
    Reuse,
    /// ConsumeToken: the token is single-use
    Consume,
}

/// Longest accepted token lifetime
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub bcrypt_cost: u32,
    pub token_ttl: ChronoDuration,
    pub token_sweep_interval: Duration,
    pub join_token_policy: JoinTokenPolicy,
    pub delivery_queue_capacity: usize,
    pub delivery_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            password: String::new(),
            bcrypt_cost: 7,
            token_ttl: ChronoDuration::hours(24),
            token_sweep_interval: Duration::from_secs(600),
            join_token_policy: JoinTokenPolicy::Reuse,
            delivery_queue_capacity: 64,
            delivery_timeout: Duration::from_millis(5000),
            write_timeout: Duration::from_secs(10),
        }
    }
}

// The room password never reaches the logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("token_ttl", &self.token_ttl)
            .field("token_sweep_interval", &self.token_sweep_interval)
            .field("join_token_policy", &self.join_token_policy)
            .field("delivery_queue_capacity", &self.delivery_queue_capacity)
            .field("delivery_timeout", &self.delivery_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {}",
                self.bcrypt_cost
            ));
        }
        if self.token_ttl <= ChronoDuration::zero() {
            return Err("token ttl must be positive".to_string());
        }
        if self.token_ttl > ChronoDuration::days(MAX_TOKEN_TTL_DAYS) {
            return Err(format!(
                "token ttl must be at most {MAX_TOKEN_TTL_DAYS} days, got {} seconds",
                self.token_ttl.num_seconds()
            ));
        }
        if self.delivery_queue_capacity == 0 {
            return Err("delivery queue capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
