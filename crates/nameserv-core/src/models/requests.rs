//! Request types accepted by the name server operations.

use crate::error::{NameServerError, Result};
use crate::path;
use crate::registration::{Extras, ServiceRef};
use serde::{Deserialize, Serialize};

/// Everything needed to (re)create one binding.
///
/// Clients keep a list of these for the services they host and replay it
/// through `rebindObjects` whenever they notice the server restarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebindInfo {
    pub parent_path: String,
    pub node_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extras: Extras,
    pub service_ref: ServiceRef,
}

impl RebindInfo {
    /// Build from a full binding path.
    pub fn new(
        binding_path: &str,
        description: impl Into<String>,
        extras: Extras,
        service_ref: ServiceRef,
    ) -> Result<Self> {
        let (parent, name) = path::split_binding_path(binding_path)
            .ok_or_else(|| NameServerError::bad_path(binding_path))?;
        Ok(Self {
            parent_path: parent.to_string(),
            node_name: name.to_string(),
            description: description.into(),
            extras,
            service_ref,
        })
    }

    pub fn full_path(&self) -> String {
        path::join(&self.parent_path, &self.node_name)
    }
}
