//! Reply types returned by the name server operations.
//!
//! Every reply that can race with a server restart carries the server's
//! cookie, even when the lookup itself missed.

use crate::registration::{Extras, ServiceRef};
use serde::{Deserialize, Serialize};

/// Result of `bindingExists` / `scopeExists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsReply {
    pub found: bool,
    pub cookie: u64,
}

/// Result of `getObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupReply {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_ref: Option<ServiceRef>,
    pub cookie: u64,
}

/// Name and description of a node (`queryNameInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameInfo {
    pub name: String,
    pub description: String,
}

/// Name, description and extra values of a binding (`queryNameInfo2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingInfo {
    pub name: String,
    pub description: String,
    pub extras: Extras,
}

/// Result of `queryScopeKeys`.
///
/// When `changed` is false the scope was not enumerated and `names` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeKeys {
    pub changed: bool,
    pub serial: u64,
    pub names: Vec<String>,
}

impl ScopeKeys {
    pub(crate) fn unchanged(serial: u64) -> Self {
        Self {
            changed: false,
            serial,
            names: Vec::new(),
        }
    }
}

/// One binding as listed by `enumObjects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameServerInfo {
    pub service_ref: ServiceRef,
    pub name: String,
    pub description: String,
    pub extras: Extras,
}

/// One sub-scope as listed by `enumSubScopes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    pub name: String,
    pub description: String,
}

/// Per-item outcome of a batch rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebindResult {
    Success,
    /// The path exists but names a scope.
    NotATerminal,
    /// Anything else went wrong with this item.
    Exception,
}

/// Result of `rebindObjects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebindReply {
    /// False when the client's cookie is stale; nothing was done.
    pub ok: bool,
    pub results: Vec<RebindResult>,
    pub cookie: u64,
}

/// Result of `renewLeases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewReply {
    /// False when the client's cookie is stale; nothing was done.
    pub ok: bool,
    pub results: Vec<bool>,
    pub cookie: u64,
}
