//! UseCase: チャットセッション
//!
//! 1 接続につき 1 つのセッションを走らせる。
//!
//! 1. 配信キューを作り、レジストリに登録する（ドロップガードで解除を保証）
//! 2. 最初のフレームとして自分の identity を書き込む
//! 3. 受信ループ（クライアント → MessageActor）と送信ループ
//!    （配信キュー → クライアント）を並行に動かし、どちらかが終わったら終了する
//!
//! 接続エラーはこのセッションだけを終わらせ、他のセッションや actor には波及しない。

use std::sync::Arc;

use hearth_shared::time::Clock;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{
    actor::MessageActorHandle,
    domain::{
        ChatMessage, ConnectedUser, ConnectionError, DeliveryQueue, ErrorNotice, FrameSink,
        FrameSource, InboundFrame, MessageBody, Payload, SessionId, UserIdentity, UserRegistry,
    },
};

/// In-band error text for a failed submission to the message actor
pub const SUBMIT_FAILED_NOTICE: &str = "failed to send message";

/// In-band error text for a binary frame that is not UTF-8
pub const INVALID_UTF8_NOTICE: &str = "message must be valid UTF-8";

/// チャットセッションのユースケース
pub struct ChatSessionUseCase {
    registry: Arc<dyn UserRegistry>,
    messages: MessageActorHandle,
    clock: Arc<dyn Clock>,
    queue_capacity: usize,
}

/// Removes the session from the registry when dropped.
///
/// Owned by the session future, so removal happens exactly once whether the
/// session ends on a read fault, a write fault, or is cancelled outright.
struct Registration {
    registry: Arc<dyn UserRegistry>,
    session_id: SessionId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove_user(&self.session_id);
    }
}

impl ChatSessionUseCase {
    pub fn new(
        registry: Arc<dyn UserRegistry>,
        messages: MessageActorHandle,
        clock: Arc<dyn Clock>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            registry,
            messages,
            clock,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// セッションを実行
    ///
    /// # Returns
    ///
    /// セッションを終了させた接続エラー（通常のクローズは `ConnectionError::Closed`）
    pub async fn run<S, K>(&self, user: Arc<UserIdentity>, mut source: S, mut sink: K) -> ConnectionError
    where
        S: FrameSource,
        K: FrameSink,
    {
        let session_id = SessionId::generate();
        let (queue, mut receiver) = mpsc::channel(self.queue_capacity);

        self.registry.add_user(ConnectedUser {
            session_id,
            user: user.clone(),
            queue: queue.clone(),
        });
        let _registration = Registration {
            registry: self.registry.clone(),
            session_id,
        };
        tracing::info!(%session_id, user_id = %user.id, user = user.name.as_str(), "Session started");

        let reason = match self.write_identity(&user, &mut sink).await {
            Err(e) => e,
            Ok(()) => {
                tokio::select! {
                    reason = self.inbound_loop(&user, &mut source, &queue) => reason,
                    reason = outbound_loop(&mut receiver, &mut sink) => reason,
                }
            }
        };

        match &reason {
            ConnectionError::Closed => {
                tracing::info!(%session_id, user_id = %user.id, "Session closed by client");
            }
            e => {
                tracing::warn!(%session_id, user_id = %user.id, error = %e, "Session ended by connection fault");
            }
        }
        reason
    }

    async fn write_identity<K: FrameSink>(
        &self,
        user: &UserIdentity,
        sink: &mut K,
    ) -> Result<(), ConnectionError> {
        let identity = serde_json::to_string(user)
            .map_err(|e| ConnectionError::Write(format!("failed to serialize identity: {e}")))?;
        sink.send_frame(&identity).await
    }

    async fn inbound_loop<S: FrameSource>(
        &self,
        user: &Arc<UserIdentity>,
        source: &mut S,
        own_queue: &DeliveryQueue,
    ) -> ConnectionError {
        loop {
            let frame = match source.next_frame().await {
                Ok(frame) => frame,
                Err(e) => return e,
            };

            let text = match frame {
                InboundFrame::Text(text) => text,
                InboundFrame::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        notify(own_queue, INVALID_UTF8_NOTICE);
                        continue;
                    }
                },
            };

            let body = match MessageBody::new(text) {
                Ok(body) => body,
                Err(e) => {
                    notify(own_queue, &e.to_string());
                    continue;
                }
            };

            let message = ChatMessage::new(user.clone(), self.clock.now(), body);
            if let Err(e) = self.messages.new_message(message).await {
                tracing::error!(user_id = %user.id, error = %e, "Failed to submit message");
                notify(own_queue, SUBMIT_FAILED_NOTICE);
            }
        }
    }
}

async fn outbound_loop<K: FrameSink>(
    receiver: &mut mpsc::Receiver<Payload>,
    sink: &mut K,
) -> ConnectionError {
    while let Some(payload) = receiver.recv().await {
        if let Err(e) = sink.send_frame(&payload).await {
            return e;
        }
    }
    ConnectionError::Closed
}

/// Push an `{"err": ...}` payload onto the sender's own queue.
///
/// Best effort: a full queue means the client is already far behind.
fn notify(queue: &DeliveryQueue, text: &str) {
    let payload = match ErrorNotice::new(text).to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize error notice");
            return;
        }
    };
    match queue.try_send(payload) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("Delivery queue full, dropping error notice"),
        Err(TrySendError::Closed(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actor::FanoutSettings, domain::UserName, infrastructure::InMemoryUserRegistry};
    use async_trait::async_trait;
    use hearth_shared::time::SystemClock;
    use std::time::Duration;

    struct ChannelSource(mpsc::UnboundedReceiver<InboundFrame>);

    #[async_trait]
    impl FrameSource for ChannelSource {
        async fn next_frame(&mut self) -> Result<InboundFrame, ConnectionError> {
            self.0.recv().await.ok_or(ConnectionError::Closed)
        }
    }

    struct ChannelSink(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl FrameSink for ChannelSink {
        async fn send_frame(&mut self, payload: &str) -> Result<(), ConnectionError> {
            self.0
                .send(payload.to_string())
                .map_err(|e| ConnectionError::Write(e.to_string()))
        }
    }

    struct FailingSink;

    #[async_trait]
    impl FrameSink for FailingSink {
        async fn send_frame(&mut self, _payload: &str) -> Result<(), ConnectionError> {
            Err(ConnectionError::Timeout)
        }
    }

    fn create_usecase() -> (Arc<ChatSessionUseCase>, Arc<InMemoryUserRegistry>) {
        let registry = Arc::new(InMemoryUserRegistry::new());
        let messages = MessageActorHandle::spawn(
            registry.clone(),
            FanoutSettings {
                delivery_timeout: Duration::from_millis(100),
                ..FanoutSettings::default()
            },
        );
        let usecase = ChatSessionUseCase::new(registry.clone(), messages, Arc::new(SystemClock), 16);
        (Arc::new(usecase), registry)
    }

    fn user(name: &str) -> Arc<UserIdentity> {
        Arc::new(UserIdentity::new(UserName::new(name.to_string()).unwrap()))
    }

    struct Client {
        input: mpsc::UnboundedSender<InboundFrame>,
        output: mpsc::UnboundedReceiver<String>,
        handle: tokio::task::JoinHandle<ConnectionError>,
    }

    fn connect(usecase: &Arc<ChatSessionUseCase>, user: Arc<UserIdentity>) -> Client {
        let (input, source_rx) = mpsc::unbounded_channel();
        let (sink_tx, output) = mpsc::unbounded_channel();
        let usecase = usecase.clone();
        let handle = tokio::spawn(async move {
            usecase
                .run(user, ChannelSource(source_rx), ChannelSink(sink_tx))
                .await
        });
        Client {
            input,
            output,
            handle,
        }
    }

    async fn next_json(output: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
        let frame = tokio::time::timeout(Duration::from_secs(2), output.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("session output closed");
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_first_frame_is_identity() {
        // テスト項目: 最初のフレームは自分の identity レコード
        // given (前提条件):
        let (usecase, _registry) = create_usecase();
        let jonah = user("jonah");

        // when (操作):
        let mut client = connect(&usecase, jonah.clone());
        let first = next_json(&mut client.output).await;

        // then (期待する結果):
        assert_eq!(first["id"], jonah.id.to_string());
        assert_eq!(first["name"], "jonah");
    }

    #[tokio::test]
    async fn test_message_is_broadcast_to_everyone() {
        // テスト項目: 送信したメッセージが送信者を含む全員に届く
        // given (前提条件):
        let (usecase, _registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        let mut bob = connect(&usecase, user("bob"));
        next_json(&mut alice.output).await;
        next_json(&mut bob.output).await;

        // when (操作):
        alice
            .input
            .send(InboundFrame::Text("hello".to_string()))
            .unwrap();

        // then (期待する結果):
        let to_alice = next_json(&mut alice.output).await;
        let to_bob = next_json(&mut bob.output).await;
        assert_eq!(to_alice["body"], "hello");
        assert_eq!(to_alice["user"]["name"], "alice");
        assert_eq!(to_alice, to_bob);
    }

    #[tokio::test]
    async fn test_empty_body_gets_in_band_error() {
        // テスト項目: 空のメッセージは送信者だけに err が返り、セッションは継続する
        // given (前提条件):
        let (usecase, _registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;

        // when (操作):
        alice.input.send(InboundFrame::Text("  ".to_string())).unwrap();
        alice
            .input
            .send(InboundFrame::Text("still here".to_string()))
            .unwrap();

        // then (期待する結果):
        let notice = next_json(&mut alice.output).await;
        assert!(notice["err"].is_string());
        let message = next_json(&mut alice.output).await;
        assert_eq!(message["body"], "still here");
    }

    #[tokio::test]
    async fn test_invalid_utf8_binary_gets_in_band_error() {
        // テスト項目: UTF-8 でないバイナリフレームは err が返る
        // given (前提条件):
        let (usecase, _registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;

        // when (操作):
        alice
            .input
            .send(InboundFrame::Binary(vec![0xff, 0xfe, 0xfd]))
            .unwrap();

        // then (期待する結果):
        let notice = next_json(&mut alice.output).await;
        assert_eq!(notice["err"], INVALID_UTF8_NOTICE);
    }

    #[tokio::test]
    async fn test_utf8_binary_is_accepted_as_text() {
        // テスト項目: UTF-8 のバイナリフレームは通常のメッセージとして扱う
        // given (前提条件):
        let (usecase, _registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;

        // when (操作):
        alice
            .input
            .send(InboundFrame::Binary("やあ".as_bytes().to_vec()))
            .unwrap();

        // then (期待する結果):
        let message = next_json(&mut alice.output).await;
        assert_eq!(message["body"], "やあ");
    }

    #[tokio::test]
    async fn test_close_unregisters_session() {
        // テスト項目: クライアントが切断するとレジストリから削除される
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;
        assert_eq!(registry.count(), 1);

        // when (操作):
        drop(alice.input);
        let reason = alice.handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(reason, ConnectionError::Closed);
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn test_write_fault_ends_only_that_session() {
        // テスト項目: 書き込み失敗はそのセッションだけを終了させる
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;
        let (_input, source_rx) = mpsc::unbounded_channel();

        // when (操作):
        let reason = usecase
            .run(user("bob"), ChannelSource(source_rx), FailingSink)
            .await;

        // then (期待する結果):
        assert_eq!(reason, ConnectionError::Timeout);
        assert_eq!(registry.count(), 1);
        alice
            .input
            .send(InboundFrame::Text("still alive".to_string()))
            .unwrap();
        let message = next_json(&mut alice.output).await;
        assert_eq!(message["body"], "still alive");
    }

    #[tokio::test]
    async fn test_cancelled_session_is_unregistered() {
        // テスト項目: セッションのタスクが中断されてもレジストリから削除される
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let mut alice = connect(&usecase, user("alice"));
        next_json(&mut alice.output).await;

        // when (操作):
        alice.handle.abort();
        let _ = alice.handle.await;

        // then (期待する結果):
        assert_eq!(registry.count(), 0);
    }
}
