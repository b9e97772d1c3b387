//! `MessageActor` - serialized owner of the chat history.
//!
//! For each new message the actor serializes it once, pushes the shared
//! payload to every session in a registry snapshot, then appends it to the
//! tail bucket. Broadcast therefore happens-before the message is visible to
//! any later history read, and reads never observe a half-appended bucket.
//!
//! # Backpressure
//!
//! Each recipient has a bounded queue. Fan-out first tries a non-blocking
//! enqueue; if the queue is full it waits up to `delivery_timeout` for room
//! and then drops the payload for that recipient only. A closed queue means
//! the session already ended and is skipped.

use std::{sync::Arc, time::Duration};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};
use tracing::{debug, error, info, warn};

use crate::domain::{
    ChatMessage, ConnectedUser, History, HistoryError, HistoryPage, Payload, SubmitError,
    UserRegistry,
};

use super::command::MessageCommand;

/// Mailbox depth for the message actor.
const MESSAGE_CHANNEL_BUFFER: usize = 1024;

/// Fan-out tuning
#[derive(Debug, Clone, Copy)]
pub struct FanoutSettings {
    /// Longest a full recipient queue may stall fan-out before the payload is
    /// dropped for that recipient
    pub delivery_timeout: Duration,
    /// Messages per history bucket
    pub bucket_capacity: usize,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(5),
            bucket_capacity: crate::domain::BUCKET_CAPACITY,
        }
    }
}

/// Outcome of pushing one payload to one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The recipient's queue stayed full past the delivery timeout
    Dropped,
    /// The recipient's session has already ended
    Closed,
}

/// Handle to the `MessageActor`.
#[derive(Clone)]
pub struct MessageActorHandle {
    sender: mpsc::Sender<MessageCommand>,
}

impl MessageActorHandle {
    /// Spawn the actor task and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(registry: Arc<dyn UserRegistry>, settings: FanoutSettings) -> Self {
        let (sender, receiver) = mpsc::channel(MESSAGE_CHANNEL_BUFFER);
        let actor = MessageActor {
            receiver,
            registry,
            settings,
            history: History::with_bucket_capacity(settings.bucket_capacity),
        };

        tokio::spawn(actor.run());

        Self { sender }
    }

    /// Submit a message for broadcast and storage.
    ///
    /// Resolves as soon as the command is queued; it does not wait for fan-out.
    pub async fn new_message(&self, message: ChatMessage) -> Result<(), SubmitError> {
        self.sender
            .send(MessageCommand::NewMessage { message })
            .await
            .map_err(|e| SubmitError(format!("channel send failed: {e}")))
    }

    /// Serialized history page; `-1` is the newest bucket.
    pub async fn get_messages(&self, page: i64) -> Result<HistoryPage, HistoryError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MessageCommand::GetMessages {
                page,
                respond_to: tx,
            })
            .await
            .map_err(|e| HistoryError::Unavailable(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| HistoryError::Unavailable(format!("response receive failed: {e}")))?
    }
}

struct MessageActor {
    receiver: mpsc::Receiver<MessageCommand>,
    registry: Arc<dyn UserRegistry>,
    settings: FanoutSettings,
    history: History,
}

impl MessageActor {
    async fn run(mut self) {
        info!(target: "hearth.actor.message", "MessageActor started");

        while let Some(command) = self.receiver.recv().await {
            self.handle_command(command).await;
        }

        info!(
            target: "hearth.actor.message",
            messages = self.history.total_messages(),
            "MessageActor stopped"
        );
    }

    async fn handle_command(&mut self, command: MessageCommand) {
        match command {
            MessageCommand::NewMessage { message } => self.handle_new_message(message).await,

            MessageCommand::GetMessages { page, respond_to } => {
                let result = self.history.page(page);
                if let Err(HistoryError::Serialization(e)) = &result {
                    error!(target: "hearth.actor.message", page, error = %e, "History serialization failed");
                }
                let _ = respond_to.send(result);
            }
        }
    }

    async fn handle_new_message(&mut self, message: ChatMessage) {
        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    target: "hearth.actor.message",
                    user_id = %message.user.id,
                    error = %e,
                    "Failed to serialize message, dropping it"
                );
                return;
            }
        };

        let recipients = self.registry.snapshot();
        let mut delivered = 0usize;
        for recipient in &recipients {
            if self.deliver(recipient, &payload).await == Delivery::Delivered {
                delivered += 1;
            }
        }
        debug!(
            target: "hearth.actor.message",
            user_id = %message.user.id,
            delivered,
            recipients = recipients.len(),
            "Broadcasted message"
        );

        self.history.append(message);
    }

    async fn deliver(&self, recipient: &ConnectedUser, payload: &Payload) -> Delivery {
        match recipient.queue.try_send(Payload::clone(payload)) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
            Err(TrySendError::Full(payload)) => {
                match tokio::time::timeout(
                    self.settings.delivery_timeout,
                    recipient.queue.send(payload),
                )
                .await
                {
                    Ok(Ok(())) => Delivery::Delivered,
                    Ok(Err(_)) => Delivery::Closed,
                    Err(_) => {
                        warn!(
                            target: "hearth.actor.message",
                            session_id = %recipient.session_id,
                            user_id = %recipient.user.id,
                            "Delivery queue full, dropping message for slow recipient"
                        );
                        Delivery::Dropped
                    }
                }
            }
        }
    }
}
