//! Scope management handlers.

use super::{get_str_param, require_str_param};
use crate::server::AppState;
use serde::Deserialize;
use serde_json::{json, Value};

/// One level of a `createScopePath` call given as parts.
#[derive(Debug, Deserialize)]
struct ScopePart {
    name: String,
    #[serde(default)]
    description: String,
}

pub fn create_scope(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let parent = require_str_param(params, "parent_path", "parentPath")?;
    let name = require_str_param(params, "name", "name")?;
    let description = get_str_param(params, "description", "description").unwrap_or_default();
    state.service.create_scope(&parent, &name, description)?;
    Ok(json!({ "success": true }))
}

/// Accepts either `path` (+ `description`) or `parts`.
pub fn create_scope_path(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    if let Some(parts) = params.get("parts") {
        let parts: Vec<ScopePart> = serde_json::from_value(parts.clone())?;
        let parts: Vec<(String, String)> = parts
            .into_iter()
            .map(|part| (part.name, part.description))
            .collect();
        state.service.create_scope_path_parts(&parts)?;
    } else {
        let path = require_str_param(params, "path", "path")?;
        let description = get_str_param(params, "description", "description").unwrap_or_default();
        state.service.create_scope_path(&path, description)?;
    }
    Ok(json!({ "success": true }))
}

pub fn remove_scope(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    state.service.remove_scope(&path)?;
    Ok(json!({ "success": true }))
}

pub fn clear_scope(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    let removed = state.service.clear_scope(&path)?;
    Ok(json!({ "removed": removed }))
}
