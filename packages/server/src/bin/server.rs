//! hearth chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hearth-server -- --password look24
//! cargo run --bin hearth-server -- --host 0.0.0.0 --port 3000 --password look24
//! ```

use std::time::Duration;

use clap::Parser;
use hearth_server::{
    app::build_server,
    config::{JoinTokenPolicy, ServerConfig},
};
use hearth_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hearth-server")]
#[command(about = "Single-room WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HEARTH_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HEARTH_PORT", default_value = "8080")]
    port: u16,

    /// Shared room password
    #[arg(long, env = "HEARTH_PASSWORD", hide_env_values = true)]
    password: String,

    /// bcrypt cost used to hash the room password
    #[arg(long, default_value = "7")]
    bcrypt_cost: u32,

    /// Token lifetime in seconds
    #[arg(long, default_value = "86400")]
    token_ttl_secs: i64,

    /// Period of the expired-token sweep in seconds
    #[arg(long, default_value = "600")]
    token_sweep_secs: u64,

    /// Whether /join keeps or consumes the token
    #[arg(long, value_enum, default_value = "reuse")]
    join_token_policy: JoinTokenPolicy,

    /// Per-user delivery queue capacity
    #[arg(long, default_value = "64")]
    queue_capacity: usize,

    /// How long fan-out waits on a full queue before dropping, in milliseconds
    #[arg(long, default_value = "5000")]
    delivery_timeout_ms: u64,

    /// WebSocket write timeout in seconds
    #[arg(long, default_value = "10")]
    write_timeout_secs: u64,
}

impl TryFrom<Args> for ServerConfig {
    type Error = String;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let token_ttl = chrono::Duration::try_seconds(args.token_ttl_secs)
            .ok_or_else(|| format!("token ttl of {} seconds is out of range", args.token_ttl_secs))?;

        Ok(Self {
            host: args.host,
            port: args.port,
            password: args.password,
            bcrypt_cost: args.bcrypt_cost,
            token_ttl,
            token_sweep_interval: Duration::from_secs(args.token_sweep_secs),
            join_token_policy: args.join_token_policy,
            delivery_queue_capacity: args.queue_capacity,
            delivery_timeout: Duration::from_millis(args.delivery_timeout_ms),
            write_timeout: Duration::from_secs(args.write_timeout_secs),
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = match ServerConfig::try_from(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            std::process::exit(1);
        }
    };
    let host = config.host.clone();
    let port = config.port;

    let server = match build_server(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(&host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(ttl_secs: &str) -> Args {
        Args::try_parse_from([
            "hearth-server",
            "--password",
            "look24",
            "--token-ttl-secs",
            ttl_secs,
        ])
        .unwrap()
    }

    #[test]
    fn test_default_ttl_converts() {
        // テスト項目: デフォルトの TTL は 24 時間に変換される
        // given (前提条件):
        let args = parse("86400");

        // when (操作):
        let config = ServerConfig::try_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.token_ttl, chrono::Duration::hours(24));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unrepresentable_ttl_is_an_error() {
        // テスト項目: 表現できない TTL はパニックせずエラーになる
        // given (前提条件):
        let args = parse(&i64::MAX.to_string());

        // when (操作):
        let result = ServerConfig::try_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_representable_but_huge_ttl_fails_validation() {
        // テスト項目: 表現はできるが長すぎる TTL は検証で拒否される
        // given (前提条件):
        let args = parse("10000000000000");

        // when (操作):
        let config = ServerConfig::try_from(args).unwrap();

        // then (期待する結果):
        assert!(config.validate().is_err());
    }
}
