//! blocknative-core: envelope and payload schema for the Blocknative realtime API.
//!
//! # Overview
//!
//! Every outbound message is a shared [`Header`] merged with one body
//! variant (the `initialize` handshake has none). The core crate defines:
//!
//! - [`Header`] / [`Blockchain`]: the envelope every message starts from
//! - [`Message`]: factory-built outbound messages with fixed category/event codes
//! - [`Config`] / [`Scope`]: the watch-configuration body
//! - [`EventFrame`]: the inbound event payload and its nested structures
//! - [`resolve_api_key`]: explicit key / environment fallback policy
//! - [`DecodeError`]: failure decoding an inbound frame
//!
//! Nothing here performs I/O; see `blocknative-ws` for the socket side.

pub mod api_key;
pub mod config;
pub mod error;
pub mod event;
pub mod header;
pub mod message;

pub use api_key::{resolve_api_key, Environment, ProcessEnv, API_KEY_ENV};
pub use config::{Config, Filter, Scope};
pub use error::DecodeError;
pub use event::{
    Asset, BalanceChange, Breakdown, ContractCall, ContractParams, Event, EventFrame,
    InternalTransaction, NetBalanceChange, TransactionState,
};
pub use header::{Blockchain, Header};
pub use message::{Body, Message, MessageKind};
