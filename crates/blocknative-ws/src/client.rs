//! WebSocket client for the Blocknative realtime API.

use async_trait::async_trait;
use blocknative_core::{resolve_api_key, DecodeError, EventFrame, Header, Message, ProcessEnv};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message as Frame};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::connection::Connection;
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// `ws` or `wss`.
    pub scheme: String,
    /// Host, optionally with `:port`.
    pub host: String,
    pub path: String,
    /// API key. `None` or empty falls back to `BLOCKNATIVE_DAPP_ID`.
    pub api_key: Option<String>,
    /// Log the service's reply to the `initialize` handshake.
    pub print_connect_response: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            scheme: "wss".into(),
            host: "api.blocknative.com".into(),
            path: "/v0".into(),
            api_key: None,
            print_connect_response: false,
        }
    }
}

impl ClientOptions {
    /// Assemble and check the endpoint URL.
    pub fn url(&self) -> Result<Url, ClientError> {
        let path = self.path.trim_start_matches('/');
        let raw = format!("{}://{}/{}", self.scheme, self.host, path);
        if self.host.trim().is_empty() {
            return Err(ClientError::InvalidUrl {
                url: raw,
                reason: "empty host".into(),
            });
        }
        let url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ClientError::InvalidUrl {
                url: raw,
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }
}

/// A single WebSocket connection to the service.
///
/// Owns the socket; there is no background task and no reconnect.
pub struct BlocknativeClient {
    url: String,
    api_key: String,
    print_connect_response: bool,
    stream: WsStream,
    closed: bool,
}

impl BlocknativeClient {
    /// Open the socket described by `options`.
    pub async fn connect(options: ClientOptions) -> Result<Self, ClientError> {
        let url = options.url()?.to_string();
        let api_key = resolve_api_key(options.api_key.as_deref().unwrap_or_default(), &ProcessEnv);
        if api_key.is_empty() {
            tracing::warn!("no API key configured; the service will reject the handshake");
        }

        tracing::info!(url = %url, "connecting via WebSocket");
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::Connect {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(url = %url, "WebSocket connected");

        Ok(Self {
            url,
            api_key,
            print_connect_response: options.print_connect_response,
            stream,
            closed: false,
        })
    }

    /// Send the `initialize` handshake and wait for the reply.
    pub async fn initialize(&mut self, header: Header) -> Result<EventFrame, ClientError> {
        self.send_json(&Message::initialize(header)).await?;
        let reply = self.receive_event().await?;
        if self.print_connect_response {
            tracing::info!(
                connection_id = %reply.connection_id,
                server_version = %reply.server_version,
                status = %reply.status,
                "connect response"
            );
        }
        if reply.is_error() {
            return Err(ClientError::Rejected {
                reason: reply.reason.unwrap_or_else(|| "unspecified".into()),
            });
        }
        Ok(reply)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connection for BlocknativeClient {
    async fn send_value(&mut self, value: Value) -> Result<(), ClientError> {
        if self.closed {
            return Err(ClientError::Closed);
        }
        let text = value.to_string();
        tracing::trace!(len = text.len(), "sending frame");
        self.stream
            .send(Frame::Text(text.into()))
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))
    }

    async fn receive_value(&mut self) -> Result<Value, ClientError> {
        if self.closed {
            return Err(ClientError::Closed);
        }
        loop {
            match self.stream.next().await {
                None => {
                    self.closed = true;
                    return Err(ClientError::Closed);
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WS receive error");
                    return Err(ClientError::WebSocket(e.to_string()));
                }
                Some(Ok(Frame::Text(text))) => {
                    return serde_json::from_str(&text)
                        .map_err(|e| ClientError::Decode(DecodeError::Json(e)));
                }
                Some(Ok(Frame::Binary(bytes))) => {
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|_| DecodeError::Binary { len: bytes.len() })?;
                    return serde_json::from_str(text)
                        .map_err(|e| ClientError::Decode(DecodeError::Json(e)));
                }
                Some(Ok(Frame::Close(frame))) => {
                    tracing::info!(?frame, "WebSocket closed by server");
                    self.closed = true;
                    return Err(ClientError::Closed);
                }
                // ping/pong: tungstenite answers pings itself
                Some(Ok(_)) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(ClientError::WebSocket(e.to_string())),
        }
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }
}
