//! axum WebSocket adapters for the session's frame seams.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{ConnectionError, FrameSink, FrameSource, InboundFrame};

pub struct WebSocketFrameSource {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameSource for WebSocketFrameSource {
    async fn next_frame(&mut self) -> Result<InboundFrame, ConnectionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(InboundFrame::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(InboundFrame::Binary(bytes.to_vec()));
                }
                // Control frames are answered by the protocol layer
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(ConnectionError::Closed),
                Some(Err(e)) => return Err(ConnectionError::Read(e.to_string())),
            }
        }
    }
}

pub struct WebSocketFrameSink {
    sink: SplitSink<WebSocket, Message>,
    write_timeout: Duration,
}

#[async_trait]
impl FrameSink for WebSocketFrameSink {
    async fn send_frame(&mut self, payload: &str) -> Result<(), ConnectionError> {
        let frame = Message::Text(payload.to_owned().into());
        match tokio::time::timeout(self.write_timeout, self.sink.send(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::Write(e.to_string())),
            Err(_) => Err(ConnectionError::Timeout),
        }
    }
}

/// Split an upgraded socket into its read and write halves.
///
/// Every write on the sink is bounded by `write_timeout`.
pub fn split_socket(
    socket: WebSocket,
    write_timeout: Duration,
) -> (WebSocketFrameSource, WebSocketFrameSink) {
    let (sink, stream) = socket.split();
    (
        WebSocketFrameSource { stream },
        WebSocketFrameSink {
            sink,
            write_timeout,
        },
    )
}
