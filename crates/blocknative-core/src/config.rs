//! Watch-configuration body sent with `configs` / `put`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single filter predicate: field name → match expression.
///
/// Predicates use the service's jsql syntax, e.g. `{"status": "pending"}` or
/// `{"contractCall.methodName": "transfer"}`.
pub type Filter = Map<String, Value>;

/// What a configuration applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    /// The literal `"global"`, applying to every watched address.
    Global,
    /// A single account or contract address. Not validated.
    Address(String),
}

impl Scope {
    pub const GLOBAL: &'static str = "global";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => Self::GLOBAL,
            Self::Address(addr) => addr,
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        if s == Self::GLOBAL {
            Self::Global
        } else {
            Self::Address(s)
        }
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Global => Scope::GLOBAL.to_string(),
            Scope::Address(addr) => addr,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration body.
///
/// `abi`, `filters` and `watchAddress` are left out of the JSON entirely when
/// unset. The service treats a missing `abi` differently from an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Opaque ABI payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub watch_address: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Config {
    pub fn new(scope: impl Into<Scope>, watch_address: bool, abi: Option<Value>) -> Self {
        Self {
            scope: scope.into(),
            filters: Vec::new(),
            abi,
            watch_address,
        }
    }

    /// Append one predicate. Order is preserved on the wire.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }
}
