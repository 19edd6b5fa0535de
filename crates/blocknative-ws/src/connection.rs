//! The `Connection` trait: what the protocol layer needs from a transport.

use async_trait::async_trait;
use blocknative_core::{DecodeError, EventFrame, Header};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// A bidirectional JSON frame channel to the service.
///
/// One frame carries one JSON value. Sends and receives take `&mut self`, so
/// at most one of each is in flight per connection.
#[async_trait]
pub trait Connection: Send {
    /// Send one JSON value as a frame.
    async fn send_value(&mut self, value: Value) -> Result<(), ClientError>;

    /// Wait for the next JSON frame.
    async fn receive_value(&mut self) -> Result<Value, ClientError>;

    /// Close the connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), ClientError>;

    /// The API key this connection resolved at construction.
    fn api_key(&self) -> &str;

    /// Serialize `msg` and send it.
    async fn send_json<T: Serialize + Sync>(&mut self, msg: &T) -> Result<(), ClientError> {
        let value = serde_json::to_value(msg).map_err(ClientError::Encode)?;
        self.send_value(value).await
    }

    /// Receive the next frame and deserialize it as `T`.
    async fn receive_json<T: DeserializeOwned>(&mut self) -> Result<T, ClientError> {
        let value = self.receive_value().await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(DecodeError::Json(e)))
    }

    /// Receive the next frame as an event payload.
    async fn receive_event(&mut self) -> Result<EventFrame, ClientError> {
        self.receive_json().await
    }

    /// A mainnet header carrying this connection's API key.
    fn mainnet_header(&self) -> Header {
        Header::mainnet(self.api_key())
    }
}
