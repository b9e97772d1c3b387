//! `AuthActor` - serialized owner of the token table.
//!
//! Every login, join, history and logout request funnels through this one
//! task. Because commands never interleave, expiry checks and deletions on the
//! token table need no locking and are atomic with respect to each other.

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use hearth_shared::time::Clock;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::domain::{
    AuthError, AuthToken, PasswordVerifier, TokenGenerator, TokenStore, UserIdentity,
};

use super::command::AuthCommand;

/// Mailbox depth for the auth actor.
const AUTH_CHANNEL_BUFFER: usize = 100;

/// Lower bound for the expired-token sweep period.
const MIN_SWEEP_INTERVAL: StdDuration = StdDuration::from_millis(10);

/// Token lifetime and housekeeping period
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    /// Time from issue to expiry
    pub token_ttl: Duration,
    /// How often expired tokens are purged in bulk
    pub sweep_interval: StdDuration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::hours(24),
            sweep_interval: StdDuration::from_secs(600),
        }
    }
}

/// Handle to the `AuthActor`.
///
/// Cheap to clone. All methods resolve once the actor has processed the
/// command; a dead actor surfaces as [`AuthError::Unavailable`].
#[derive(Clone)]
pub struct AuthActorHandle {
    sender: mpsc::Sender<AuthCommand>,
}

impl AuthActorHandle {
    /// Spawn the actor task and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(
        verifier: Arc<dyn PasswordVerifier>,
        generator: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
        settings: AuthSettings,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(AUTH_CHANNEL_BUFFER);
        let actor = AuthActor {
            receiver,
            verifier,
            generator,
            clock,
            settings,
            tokens: TokenStore::new(),
        };

        tokio::spawn(actor.run());

        Self { sender }
    }

    /// Verify `password` and mint a token owned by `user`.
    pub async fn create_token(
        &self,
        password: String,
        user: Arc<UserIdentity>,
    ) -> Result<AuthToken, AuthError> {
        let (tx, rx) = oneshot::channel();
        self.send(AuthCommand::CreateToken {
            password,
            user,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| AuthError::Unavailable(format!("response receive failed: {e}")))?
    }

    /// Owner of `token` if it exists and has not expired. Never mutates a
    /// live entry.
    pub async fn check_token(
        &self,
        token: AuthToken,
    ) -> Result<Option<Arc<UserIdentity>>, AuthError> {
        let (tx, rx) = oneshot::channel();
        self.send(AuthCommand::CheckToken {
            token,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| AuthError::Unavailable(format!("response receive failed: {e}")))
    }

    /// Same as [`AuthActorHandle::check_token`], but a valid token is deleted.
    pub async fn consume_token(
        &self,
        token: AuthToken,
    ) -> Result<Option<Arc<UserIdentity>>, AuthError> {
        let (tx, rx) = oneshot::channel();
        self.send(AuthCommand::ConsumeToken {
            token,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| AuthError::Unavailable(format!("response receive failed: {e}")))
    }

    async fn send(&self, command: AuthCommand) -> Result<(), AuthError> {
        self.sender
            .send(command)
            .await
            .map_err(|e| AuthError::Unavailable(format!("channel send failed: {e}")))
    }
}

struct AuthActor {
    receiver: mpsc::Receiver<AuthCommand>,
    verifier: Arc<dyn PasswordVerifier>,
    generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    settings: AuthSettings,
    tokens: TokenStore,
}

impl AuthActor {
    async fn run(mut self) {
        info!(target: "hearth.actor.auth", "AuthActor started");

        let period = self.settings.sweep_interval.max(MIN_SWEEP_INTERVAL);
        let mut sweep = tokio::time::interval_at(Instant::now() + period, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = self.receiver.recv() => {
                    match msg {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!(target: "hearth.actor.auth", "AuthActor channel closed, exiting");
                            break;
                        }
                    }
                }

                _ = sweep.tick() => self.sweep_expired(),
            }
        }

        info!(
            target: "hearth.actor.auth",
            tokens_remaining = self.tokens.len(),
            "AuthActor stopped"
        );
    }

    async fn handle_command(&mut self, command: AuthCommand) {
        match command {
            AuthCommand::CreateToken {
                password,
                user,
                respond_to,
            } => {
                let result = self.create_token(password, user).await;
                let _ = respond_to.send(result);
            }

            AuthCommand::CheckToken { token, respond_to } => {
                let user = self.tokens.check(&token, self.clock.now());
                let _ = respond_to.send(user);
            }

            AuthCommand::ConsumeToken { token, respond_to } => {
                let user = self.tokens.consume(&token, self.clock.now());
                if let Some(user) = &user {
                    debug!(target: "hearth.actor.auth", user_id = %user.id, "Token consumed");
                }
                let _ = respond_to.send(user);
            }
        }
    }

    /// Password hashing runs on the blocking pool. The actor still awaits it,
    /// so commands stay serialized while the runtime keeps making progress.
    async fn create_token(
        &mut self,
        password: String,
        user: Arc<UserIdentity>,
    ) -> Result<AuthToken, AuthError> {
        let verifier = Arc::clone(&self.verifier);
        let verified = tokio::task::spawn_blocking(move || verifier.verify(&password))
            .await
            .map_err(|e| {
                error!(target: "hearth.actor.auth", error = %e, "Password verification task failed");
                AuthError::Verification(e.to_string())
            })?;

        if !verified {
            warn!(
                target: "hearth.actor.auth",
                user_name = user.name.as_str(),
                "Rejected login with invalid password"
            );
            return Err(AuthError::InvalidPassword);
        }

        let now = self.clock.now();
        let Some(expires_at) = now.checked_add_signed(self.settings.token_ttl) else {
            error!(
                target: "hearth.actor.auth",
                %now,
                ttl_secs = self.settings.token_ttl.num_seconds(),
                "Token expiry is out of range"
            );
            return Err(AuthError::ExpiryOutOfRange);
        };

        let token = self.generator.generate().map_err(|e| {
            error!(target: "hearth.actor.auth", error = %e, "Token generation failed");
            AuthError::from(e)
        })?;

        info!(
            target: "hearth.actor.auth",
            user_id = %user.id,
            user_name = user.name.as_str(),
            %expires_at,
            "Token issued"
        );
        self.tokens.insert(token.clone(), user, expires_at);
        Ok(token)
    }

    fn sweep_expired(&mut self) {
        let removed = self.tokens.purge_expired(self.clock.now());
        if removed > 0 {
            debug!(
                target: "hearth.actor.auth",
                removed,
                remaining = self.tokens.len(),
                "Purged expired tokens"
            );
        }
    }
}
