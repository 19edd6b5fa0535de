//! Outbound messages: a [`Header`] merged with one body variant.
//!
//! The (category, event) pair of a message is decided by its
//! [`MessageKind`] alone. Callers pick a constructor, never the codes.

use serde::Serialize;

use crate::config::Config;
use crate::header::Header;

/// The closed set of outbound message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Connection handshake validating the API key.
    Initialize,
    SubscribeTransaction,
    UnsubscribeTransaction,
    SubscribeAddress,
    UnsubscribeAddress,
    PutConfiguration,
}

impl MessageKind {
    pub const fn category_code(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SubscribeTransaction | Self::UnsubscribeTransaction => "activeTransaction",
            Self::SubscribeAddress | Self::UnsubscribeAddress => "accountAddress",
            Self::PutConfiguration => "configs",
        }
    }

    pub const fn event_code(self) -> &'static str {
        match self {
            Self::Initialize => "checkDappId",
            Self::SubscribeTransaction => "txSent",
            Self::UnsubscribeTransaction | Self::UnsubscribeAddress => "unwatch",
            Self::SubscribeAddress => "watch",
            Self::PutConfiguration => "put",
        }
    }
}

/// Variant body, serialized under `transaction`, `account` or `config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Body {
    Transaction { hash: String },
    Account { address: String },
    Config(Config),
}

/// A complete outbound message. Built once by a factory function and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(skip)]
    kind: MessageKind,
    #[serde(flatten)]
    header: Header,
    #[serde(flatten)]
    body: Option<Body>,
}

impl Message {
    fn build(kind: MessageKind, header: Header, body: Option<Body>) -> Self {
        Self {
            kind,
            header: header.with_codes(kind.category_code(), kind.event_code()),
            body,
        }
    }

    /// `initialize` / `checkDappId`, sent once right after connecting.
    pub fn initialize(header: Header) -> Self {
        Self::build(MessageKind::Initialize, header, None)
    }

    /// `activeTransaction` / `txSent`: start watching a transaction hash.
    pub fn subscribe_transaction(header: Header, hash: impl Into<String>) -> Self {
        Self::build(
            MessageKind::SubscribeTransaction,
            header,
            Some(Body::Transaction { hash: hash.into() }),
        )
    }

    /// `activeTransaction` / `unwatch`.
    pub fn unsubscribe_transaction(header: Header, hash: impl Into<String>) -> Self {
        Self::build(
            MessageKind::UnsubscribeTransaction,
            header,
            Some(Body::Transaction { hash: hash.into() }),
        )
    }

    /// `accountAddress` / `watch`: start watching an address.
    pub fn subscribe_address(header: Header, address: impl Into<String>) -> Self {
        Self::build(
            MessageKind::SubscribeAddress,
            header,
            Some(Body::Account { address: address.into() }),
        )
    }

    /// `accountAddress` / `unwatch`.
    pub fn unsubscribe_address(header: Header, address: impl Into<String>) -> Self {
        Self::build(
            MessageKind::UnsubscribeAddress,
            header,
            Some(Body::Account { address: address.into() }),
        )
    }

    /// `configs` / `put`.
    pub fn put_configuration(header: Header, config: Config) -> Self {
        Self::build(MessageKind::PutConfiguration, header, Some(Body::Config(config)))
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}
