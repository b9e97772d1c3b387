//! Server execution logic.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{health_check, history, join_handler, login, logout},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat relay HTTP server
///
/// # Example
///
/// ```ignore
/// let server = hearth_server::app::build_server(&config)?;
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Router with every endpoint mounted
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/join", get(join_handler))
            // HTTP エンドポイント
            .route("/login", post(login))
            .route("/history", get(history))
            .route("/logout", get(logout).post(logout))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self, host: &str, port: u16) -> std::io::Result<()> {
        let listener = TcpListener::bind((host, port)).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr: SocketAddr = listener.local_addr()?;
        tracing::info!("Chat relay listening on {}", local_addr);
        tracing::info!("Join at: ws://{}/join?token=<token>", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
