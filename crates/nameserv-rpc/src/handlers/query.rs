//! Lookup and enumeration handlers.

use super::{get_bool_param, get_str_param, require_str_param, require_u64_param};
use crate::server::AppState;
use nameserv_core::{DumpFormat, NameServerError};
use serde_json::{json, Value};

fn path_param(params: &Value) -> nameserv_core::Result<String> {
    require_str_param(params, "path", "path")
}

fn throw_if_not(params: &Value, default: bool) -> bool {
    get_bool_param(params, "throw_if_not", "throwIfNot").unwrap_or(default)
}

pub fn binding_exists(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    Ok(serde_json::to_value(state.service.binding_exists(&path)?)?)
}

pub fn scope_exists(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    Ok(serde_json::to_value(state.service.scope_exists(&path)?)?)
}

pub fn get_object(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    Ok(serde_json::to_value(state.service.get_object(&path)?)?)
}

pub fn query_name_info(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    let info = state
        .service
        .query_name_info(&path, throw_if_not(params, true))?;
    Ok(serde_json::to_value(info)?)
}

pub fn query_name_info2(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    let info = state
        .service
        .query_name_info2(&path, throw_if_not(params, true))?;
    Ok(serde_json::to_value(info)?)
}

pub fn query_scope_keys(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    let serial = require_u64_param(params, "serial", "serial")?;
    let objects_only = get_bool_param(params, "objects_only", "objectsOnly").unwrap_or(false);
    let keys = state.service.query_scope_keys(
        &path,
        serial,
        objects_only,
        throw_if_not(params, true),
    )?;
    Ok(serde_json::to_value(keys)?)
}

pub fn enum_objects(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    let objects = state
        .service
        .enum_objects(&path, throw_if_not(params, true))?;
    Ok(serde_json::to_value(objects)?)
}

pub fn enum_subscopes(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let path = path_param(params)?;
    let scopes = state
        .service
        .enum_subscopes(&path, throw_if_not(params, true))?;
    Ok(serde_json::to_value(scopes)?)
}

pub fn query_cookie(state: &AppState, _params: &Value) -> nameserv_core::Result<Value> {
    Ok(json!({ "cookie": state.service.query_cookie() }))
}

pub fn dump(state: &AppState, params: &Value) -> nameserv_core::Result<Value> {
    let format = match get_str_param(params, "format", "format") {
        Some(name) => name
            .parse::<DumpFormat>()
            .map_err(|message| NameServerError::InvalidParams { message })?,
        None => DumpFormat::default(),
    };
    Ok(json!({ "format": format, "text": state.service.dump(format) }))
}
