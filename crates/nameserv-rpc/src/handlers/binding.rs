//! Binding handlers: binds, batch rebind/renew, removal and extra values.

use super::{
    get_bool_param, get_extras, get_str_param, require_param, require_service_ref,
    require_str_param, require_u64_param,
};
use crate::server::AppState;
use nameserv_core::RebindInfo;
use serde_json::{json, Value};

pub fn bind_obj(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    let description = get_str_param(params, "description", "description").unwrap_or_default();
    state.service.bind_obj(
        &path,
        description,
        get_extras(params)?,
        require_service_ref(params)?,
    )?;
    Ok(json!({ "success": true }))
}

pub fn bind_obj2(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let parent = require_str_param(params, "parent_path", "parentPath")?;
    let name = require_str_param(params, "name", "name")?;
    let description = get_str_param(params, "description", "description").unwrap_or_default();
    state.service.bind_obj2(
        &parent,
        &name,
        description,
        get_extras(params)?,
        require_service_ref(params)?,
    )?;
    Ok(json!({ "success": true }))
}

/// Takes a full `RebindInfo` as the params object.
pub fn bind_obj3(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let info: RebindInfo = serde_json::from_value(params.clone())?;
    state.service.bind_obj3(&info)?;
    Ok(json!({ "success": true }))
}

pub fn rebind_objects(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let items: Vec<RebindInfo> = require_param(params, "items", "items")?;
    let cookie = require_u64_param(params, "cookie", "cookie")?;
    Ok(serde_json::to_value(
        state.service.rebind_objects(&items, cookie),
    )?)
}

pub fn renew_leases(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let paths: Vec<String> = require_param(params, "paths", "paths")?;
    let cookie = require_u64_param(params, "cookie", "cookie")?;
    Ok(serde_json::to_value(state.service.renew_leases(&paths, cookie))?)
}

pub fn remove_binding(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    let throw_if_not = get_bool_param(params, "throw_if_not", "throwIfNot").unwrap_or(false);
    let removed = state.service.remove_binding(&path, throw_if_not)?;
    Ok(json!({ "removed": removed }))
}

pub fn update_extra_val(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    let index = require_u64_param(params, "index", "index")?;
    let value = require_str_param(params, "value", "value")?;
    // Anything past u32 is out of range anyway
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    state.service.update_extra_val(&path, index, &value)?;
    Ok(json!({ "success": true }))
}
