//! WebSocket wrapper over tokio-tungstenite

use super::FrameSink;
use crate::error::GatewayError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on a single reassembled message; partial frames are
/// reassembled by the protocol library before they reach us.
const MAX_MESSAGE_SIZE: usize = 4 << 20;

/// One gateway WebSocket connection
pub struct GatewaySocket {
    inner: WsStream,
}

impl GatewaySocket {
    /// Open the WebSocket to the given gateway URL
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(MAX_MESSAGE_SIZE);
        config.max_frame_size = Some(MAX_MESSAGE_SIZE);

        let (inner, response) = connect_async_with_config(url, Some(config), false).await?;
        tracing::debug!(status = %response.status(), "WebSocket handshake complete");

        Ok(Self { inner })
    }

    /// Split into independently owned write and read halves
    #[must_use]
    pub fn split(self) -> (SocketWriter, SocketReader) {
        let (sink, stream) = self.inner.split();
        (SocketWriter { sink }, SocketReader { stream })
    }
}

/// An inbound frame, reduced to what the session cares about
#[derive(Debug)]
pub enum InboundFrame {
    /// A complete UTF-8 text frame
    Text(String),
    /// Close frame from the peer, with status code and reason if present
    Close(Option<(u16, String)>),
    /// Anything else (binary, ping, pong); skipped by the session.
    /// Pings are answered by the protocol library.
    Ignored(&'static str),
}

/// Read half of the gateway socket
pub struct SocketReader {
    stream: SplitStream<WsStream>,
}

impl SocketReader {
    /// Receive the next frame; `None` once the stream is finished.
    pub async fn next_frame(&mut self) -> Option<Result<InboundFrame, GatewayError>> {
        let message = match self.stream.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(e.into())),
        };
        Some(Ok(match message {
            Message::Text(text) => InboundFrame::Text(text),
            Message::Close(frame) => {
                InboundFrame::Close(frame.map(|f| (u16::from(f.code), f.reason.to_string())))
            }
            Message::Binary(_) => InboundFrame::Ignored("binary"),
            Message::Ping(_) => InboundFrame::Ignored("ping"),
            Message::Pong(_) => InboundFrame::Ignored("pong"),
            Message::Frame(_) => InboundFrame::Ignored("raw"),
        }))
    }
}

/// Write half of the gateway socket
pub struct SocketWriter {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for SocketWriter {
    async fn send_text(&mut self, frame: String) -> Result<(), GatewayError> {
        self.sink.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn send_close(&mut self, code: u16, reason: String) -> Result<(), GatewayError> {
        self.sink
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.into(),
            })))
            .await?;
        // Flush and shut the write half down; the peer's close reply
        // arrives on the read half.
        let _ = self.sink.close().await;
        Ok(())
    }
}
