//! Wiring: build actors, adapters and usecases from a [`ServerConfig`].

use std::sync::Arc;

use hearth_shared::time::{Clock, SystemClock};
use thiserror::Error;

use crate::{
    actor::{AuthActorHandle, AuthSettings, FanoutSettings, MessageActorHandle},
    config::ServerConfig,
    domain::{BUCKET_CAPACITY, UserRegistry},
    infrastructure::{BcryptPasswordVerifier, InMemoryUserRegistry, OsRandomTokenGenerator},
    ui::{Server, state::AppState},
    usecase::{
        ChatSessionUseCase, GetHistoryUseCase, JoinRoomUseCase, LoginUseCase, LogoutUseCase,
    },
};

/// The server could not be assembled
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to hash room password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

/// Build a ready-to-run server.
///
/// Spawns both actors, so it must be called from within a Tokio runtime.
///
/// # Errors
///
/// Fails on an invalid configuration or if the room password cannot be
/// hashed; the auth actor is never started in that case.
pub fn build_server(config: &ServerConfig) -> Result<Server, StartupError> {
    config.validate().map_err(StartupError::InvalidConfig)?;

    // 1. Auth actor (password hash is computed here, once)
    let verifier = BcryptPasswordVerifier::new(&config.password, config.bcrypt_cost)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = AuthActorHandle::spawn(
        Arc::new(verifier),
        Arc::new(OsRandomTokenGenerator),
        clock.clone(),
        AuthSettings {
            token_ttl: config.token_ttl,
            sweep_interval: config.token_sweep_interval,
        },
    );

    // 2. Registry and message actor
    let registry: Arc<dyn UserRegistry> = Arc::new(InMemoryUserRegistry::new());
    let messages = MessageActorHandle::spawn(
        registry.clone(),
        FanoutSettings {
            delivery_timeout: config.delivery_timeout,
            bucket_capacity: BUCKET_CAPACITY,
        },
    );

    // 3. UseCases
    let state = AppState {
        login_usecase: Arc::new(LoginUseCase::new(auth.clone())),
        join_room_usecase: Arc::new(JoinRoomUseCase::new(
            auth.clone(),
            config.join_token_policy,
        )),
        chat_session_usecase: Arc::new(ChatSessionUseCase::new(
            registry,
            messages.clone(),
            clock,
            config.delivery_queue_capacity,
        )),
        get_history_usecase: Arc::new(GetHistoryUseCase::new(auth.clone(), messages)),
        logout_usecase: Arc::new(LogoutUseCase::new(auth)),
        write_timeout: config.write_timeout,
    };

    tracing::debug!(?config, "Server assembled");

    Ok(Server::new(state))
}
