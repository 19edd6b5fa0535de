//! Inbound event payloads.
//!
//! Decode-only schema for the frames the service pushes. Amounts that can
//! exceed 2^53 (values, fees, gas prices, balance deltas) stay decimal
//! strings. `gas`, `gasUsed` and `gasPriceGwei` arrive as JSON numbers and are
//! kept as `f64`; they are for display and must not be used for accounting.
//!
//! Fields the service leaves `null` on pending transactions are `Option`s.
//! Sequences that are absent or `null` decode as empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::header::Header;

/// Treat an explicit `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One frame received from the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFrame {
    #[serde(deserialize_with = "nullable")]
    pub version: u64,
    #[serde(deserialize_with = "nullable")]
    pub server_version: String,
    pub time_stamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub connection_id: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    /// Explanation attached to `status: "error"` replies.
    pub reason: Option<String>,
    pub event: Option<Event>,
}

impl EventFrame {
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The service refused the preceding message.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }

    pub fn transaction(&self) -> Option<&TransactionState> {
        self.event.as_ref()?.transaction.as_ref()
    }
}

/// The `event` object: a header-shaped block plus the transaction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub transaction: Option<TransactionState>,
}

/// State of a watched transaction at the moment of the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionState {
    /// EIP-2718 envelope type.
    #[serde(rename = "type")]
    pub tx_type: Option<u64>,
    pub max_fee_per_gas: Option<String>,
    pub max_priority_fee_per_gas: Option<String>,
    pub base_fee_per_gas: Option<String>,

    pub time_stamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub monitor_id: String,
    #[serde(deserialize_with = "nullable")]
    pub monitor_version: String,
    /// Milliseconds spent pending, as sent by the service.
    pub time_pending: Option<String>,
    pub pending_time_stamp: Option<DateTime<Utc>>,
    pub blocks_pending: Option<u64>,

    #[serde(deserialize_with = "nullable")]
    pub hash: String,
    #[serde(deserialize_with = "nullable")]
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub gas: f64,
    pub gas_price: Option<String>,
    pub gas_price_gwei: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub nonce: u64,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
    #[serde(deserialize_with = "nullable")]
    pub input: String,
    pub gas_used: Option<f64>,

    #[serde(deserialize_with = "nullable")]
    pub asset: String,
    #[serde(deserialize_with = "nullable")]
    pub watched_address: String,
    /// `incoming` or `outgoing` relative to `watched_address`.
    #[serde(deserialize_with = "nullable")]
    pub direction: String,
    #[serde(deserialize_with = "nullable")]
    pub counterparty: String,

    /// Decoded outer call, when the service recognised it.
    pub contract_call: Option<ContractCall>,
    #[serde(deserialize_with = "nullable")]
    pub internal_transactions: Vec<InternalTransaction>,
    #[serde(deserialize_with = "nullable")]
    pub net_balance_changes: Vec<NetBalanceChange>,
}

/// A sub-call from the transaction's execution trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternalTransaction {
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub call_type: String,
    #[serde(deserialize_with = "nullable")]
    pub from: String,
    #[serde(deserialize_with = "nullable")]
    pub to: String,
    #[serde(deserialize_with = "nullable")]
    pub input: String,
    #[serde(deserialize_with = "nullable")]
    pub gas: f64,
    #[serde(deserialize_with = "nullable")]
    pub gas_used: f64,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    pub contract_call: Option<ContractCall>,
}

/// A call decoded against a known contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractCall {
    #[serde(deserialize_with = "nullable")]
    pub contract_type: String,
    #[serde(deserialize_with = "nullable")]
    pub contract_address: String,
    #[serde(deserialize_with = "nullable")]
    pub method_name: String,
    pub params: ContractParams,
    #[serde(deserialize_with = "nullable")]
    pub contract_alias: String,
    #[serde(deserialize_with = "nullable")]
    pub contract_decimals: u32,
    #[serde(deserialize_with = "nullable")]
    pub contract_name: String,
    /// `_value` scaled by `contract_decimals`.
    #[serde(deserialize_with = "nullable")]
    pub decimal_value: String,
}

/// Transfer-shaped call parameters.
///
/// Only `_from`, `_to` and `_value` are recognised. Other parameter names are
/// dropped, and a `params` value that is not an object decodes to the empty
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractParams {
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
    #[serde(rename = "_value")]
    pub value: String,
}

impl ContractParams {
    fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let field = |name: &str| match obj.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            from: field("_from"),
            to: field("_to"),
            value: field("_value"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.to.is_empty() && self.value.is_empty()
    }
}

impl<'de> Deserialize<'de> for ContractParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Net balance movement of one address across the transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetBalanceChange {
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub balance_changes: Vec<BalanceChange>,
}

/// Change of a single asset's balance.
///
/// `delta` is signed from the owning address's point of view: negative is an
/// outflow, positive an inflow. The breakdown amounts add up to `|delta|`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceChange {
    #[serde(deserialize_with = "nullable")]
    pub delta: String,
    #[serde(deserialize_with = "nullable")]
    pub asset: Asset,
    #[serde(deserialize_with = "nullable")]
    pub breakdown: Vec<Breakdown>,
}

impl BalanceChange {
    pub fn is_outflow(&self) -> bool {
        self.delta.trim_start().starts_with('-') && self.is_nonzero()
    }

    pub fn is_inflow(&self) -> bool {
        !self.delta.trim_start().starts_with('-') && self.is_nonzero()
    }

    fn is_nonzero(&self) -> bool {
        self.delta.chars().any(|c| c.is_ascii_digit() && c != '0')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Asset {
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub asset_type: String,
    #[serde(deserialize_with = "nullable")]
    pub symbol: String,
    /// Empty for the chain's native asset.
    #[serde(deserialize_with = "nullable")]
    pub contract_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Breakdown {
    #[serde(deserialize_with = "nullable")]
    pub counterparty: String,
    #[serde(deserialize_with = "nullable")]
    pub amount: String,
}
