//! blocknative-ws: WebSocket connection to the Blocknative realtime API.
//!
//! # Features
//! - [`Connection`] trait: send/receive JSON frames, close, resolved API key
//! - [`BlocknativeClient`]: tokio-tungstenite implementation with the
//!   `initialize` handshake
//! - [`ClientOptions`]: scheme/host/path endpoint selection
//!
//! Reconnection and retry are left to the caller.

pub mod client;
pub mod connection;
pub mod error;

pub use client::{BlocknativeClient, ClientOptions};
pub use connection::Connection;
pub use error::ClientError;
