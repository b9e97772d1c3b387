//! Logging setup utilities for the Hearth chat relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Targets whose events are shown at the default level when `RUST_LOG` is unset.
///
/// `hearth` covers the explicit `hearth.actor.*` targets used by the actors.
const APPLICATION_TARGETS: [&str; 4] = ["hearth", "hearth_server", "hearth_shared", "tower_http"];

/// Build the fallback filter directive used when `RUST_LOG` is not set.
fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    APPLICATION_TARGETS
        .iter()
        .copied()
        .chain(std::iter::once(binary_name))
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hearth-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use hearth_shared::logger::setup_logger;
///
/// setup_logger("hearth-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
