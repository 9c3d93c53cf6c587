//! The agent-to-ingestion bidirectional stream (§6 "Wire protocol — log
//! ingestion"): `Batch` messages client-to-server, `Ack` messages
//! server-to-client, over a long-lived WebSocket connection per agent.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::WebSocketUpgrade;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use futures_util::stream::{SplitSink, SplitStream};
use logline_protocol::{Ack, Batch};
use std::future::Future;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite};

use crate::TransportError;

/// One frame exchanged on the stream. Batches flow agent-to-ingestion, acks
/// flow the reverse direction; both share the same socket.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Frame {
    Batch(Batch),
    Ack(Ack),
}

impl Frame {
    fn into_message(self) -> Result<Message, TransportError> {
        let text =
            serde_json::to_string(&self).map_err(|e| TransportError::Protocol(e.to_string()))?;
        Ok(Message::Text(text))
    }

    fn from_text(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|e| TransportError::Protocol(e.to_string()))
    }
}

type TungsteniteStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// The client side of the stream, held by the agent's stream manager.
pub struct AgentStream {
    inner: TungsteniteStream,
}

impl AgentStream {
    /// Dials the ingestion service's WebSocket endpoint.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (inner, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self { inner })
    }

    pub async fn send_batch(&mut self, batch: &Batch) -> Result<(), TransportError> {
        let frame = Frame::Batch(batch.clone());
        let text = serde_json::to_string(&frame).map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.inner
            .send(tungstenite::Message::Text(text))
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }

    /// Awaits the next ack. Returns `Ok(None)` when the peer closed the
    /// stream cleanly.
    pub async fn recv_ack(&mut self) -> Result<Option<Ack>, TransportError> {
        loop {
            match self.inner.next().await {
                None => return Ok(None),
                Some(Ok(tungstenite::Message::Close(_))) => return Ok(None),
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return match Frame::from_text(&text)? {
                        Frame::Ack(ack) => Ok(Some(ack)),
                        Frame::Batch(_) => {
                            Err(TransportError::Protocol("expected ack, got batch".into()))
                        }
                    };
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Connection(e.to_string())),
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .close(None)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }

    /// Splits the stream into independent send/receive halves so the
    /// batcher can write batches while a separate context drains acks
    /// concurrently (spec §5: "one ack-reader context draining the reverse
    /// direction of the stream").
    pub fn split(self) -> (AgentStreamSender, AgentStreamReceiver) {
        let (sink, stream) = self.inner.split();
        (AgentStreamSender { sink }, AgentStreamReceiver { stream })
    }
}

pub struct AgentStreamSender {
    sink: futures_util::stream::SplitSink<TungsteniteStream, tungstenite::Message>,
}

impl AgentStreamSender {
    pub async fn send_batch(&mut self, batch: &Batch) -> Result<(), TransportError> {
        let text = serde_json::to_string(&Frame::Batch(batch.clone()))
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.sink
            .send(tungstenite::Message::Text(text))
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }

    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }
}

pub struct AgentStreamReceiver {
    stream: futures_util::stream::SplitStream<TungsteniteStream>,
}

impl AgentStreamReceiver {
    pub async fn recv_ack(&mut self) -> Result<Option<Ack>, TransportError> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(tungstenite::Message::Close(_))) => return Ok(None),
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return match Frame::from_text(&text)? {
                        Frame::Ack(ack) => Ok(Some(ack)),
                        Frame::Batch(_) => {
                            Err(TransportError::Protocol("expected ack, got batch".into()))
                        }
                    };
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Connection(e.to_string())),
            }
        }
    }
}

/// The server side of the stream, held by the ingestion service for one
/// connected agent. Wraps an axum-upgraded WebSocket.
pub struct IngestSocket {
    sink: SplitSink<WebSocket, Message>,
    stream: SplitStream<WebSocket>,
}

impl IngestSocket {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self { sink, stream }
    }

    /// Mounts the `/stream` WebSocket endpoint agents dial (spec §6 "Wire
    /// protocol — log ingestion"). `handler` is spawned once per accepted
    /// connection, matching "one context per connected agent stream"
    /// (spec §5).
    pub fn router<F, Fut>(handler: F) -> Router
    where
        F: Fn(IngestSocket) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Router::new().route(
            "/stream",
            get(move |ws: WebSocketUpgrade| {
                let handler = handler.clone();
                async move { ws.on_upgrade(move |socket| handler(IngestSocket::new(socket))) }
            }),
        )
    }

    /// Awaits the next batch. Returns `Ok(None)` when the agent disconnected.
    pub async fn recv_batch(&mut self) -> Result<Option<Batch>, TransportError> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Text(text))) => {
                    return match Frame::from_text(&text)? {
                        Frame::Batch(batch) => Ok(Some(batch)),
                        Frame::Ack(_) => {
                            Err(TransportError::Protocol("expected batch, got ack".into()))
                        }
                    };
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Connection(e.to_string())),
            }
        }
    }

    pub async fn send_ack(&mut self, ack: &Ack) -> Result<(), TransportError> {
        let message = Frame::Ack(ack.clone()).into_message()?;
        self.sink
            .send(message)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }
}
