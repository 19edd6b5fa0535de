//! The envelope header shared by every outbound message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api_key::{resolve_api_key, Environment, ProcessEnv};
use crate::event::nullable;

/// Chain identity carried in every header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blockchain {
    #[serde(default, deserialize_with = "nullable")]
    pub system: String,
    #[serde(default, deserialize_with = "nullable")]
    pub network: String,
}

impl Blockchain {
    pub fn new(system: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            network: network.into(),
        }
    }

    /// Ethereum mainnet, the only chain with a convenience constructor.
    pub fn ethereum_mainnet() -> Self {
        Self::new("ethereum", "main")
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.system, self.network)
    }
}

/// Envelope header.
///
/// The category and event codes start empty and are only ever written by the
/// [`Message`](crate::message::Message) factory functions. The timestamp is
/// taken once, when the header is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, deserialize_with = "nullable")]
    category_code: String,
    #[serde(default, deserialize_with = "nullable")]
    event_code: String,
    #[serde(default, deserialize_with = "nullable")]
    time_stamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "nullable")]
    dapp_id: String,
    #[serde(default, deserialize_with = "nullable")]
    version: String,
    #[serde(default, deserialize_with = "nullable")]
    blockchain: Blockchain,
}

impl Header {
    /// Build a header stamped with the current instant.
    pub fn new(api_key: impl Into<String>, blockchain: Blockchain) -> Self {
        Self {
            category_code: String::new(),
            event_code: String::new(),
            time_stamp: Utc::now(),
            dapp_id: api_key.into(),
            version: String::new(),
            blockchain,
        }
    }

    /// Ethereum mainnet header. An empty `api_key` is resolved from the
    /// process environment.
    pub fn mainnet(api_key: &str) -> Self {
        Self::mainnet_with_env(api_key, &ProcessEnv)
    }

    /// Like [`Header::mainnet`], reading the fallback key from `env`.
    pub fn mainnet_with_env(api_key: &str, env: &impl Environment) -> Self {
        Self::new(resolve_api_key(api_key, env), Blockchain::ethereum_mainnet())
    }

    /// Set the protocol version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub(crate) fn with_codes(mut self, category: &str, event: &str) -> Self {
        self.category_code = category.to_string();
        self.event_code = event.to_string();
        self
    }

    pub fn category_code(&self) -> &str {
        &self.category_code
    }

    pub fn event_code(&self) -> &str {
        &self.event_code
    }

    pub fn time_stamp(&self) -> DateTime<Utc> {
        self.time_stamp
    }

    /// The API key (`dappId` on the wire).
    pub fn dapp_id(&self) -> &str {
        &self.dapp_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.blockchain
    }
}
