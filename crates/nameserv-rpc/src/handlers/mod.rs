//! JSON-RPC request handlers, split by operation group.

mod admin;
mod binding;
mod query;
mod scope;

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use nameserv_core::{ErrorKind, Extras, NameServerError, ServiceRef, EXTRA_COUNT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn, Level};

// ============================================================================
// JSON-RPC types
// ============================================================================

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Standard code for an unknown method.
const METHOD_NOT_FOUND: i32 = -32601;
const INTERNAL_ERROR: i32 = -32603;

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
            id,
        }
    }
}

// ============================================================================
// Parameter extraction helpers
// ============================================================================

/// Extract an optional string parameter, supporting both snake_case and camelCase.
pub(crate) fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a str> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_str())
}

/// Extract a required string parameter or return an error.
pub(crate) fn require_str_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> nameserv_core::Result<String> {
    get_str_param(params, snake, camel)
        .map(String::from)
        .ok_or_else(|| missing(snake))
}

/// Extract an optional bool parameter, supporting both snake_case and camelCase.
pub(crate) fn get_bool_param(params: &Value, snake: &str, camel: &str) -> Option<bool> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_bool())
}

/// Extract a required unsigned parameter or return an error.
pub(crate) fn require_u64_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> nameserv_core::Result<u64> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_u64())
        .ok_or_else(|| missing(snake))
}

/// Deserialize a required structured parameter.
pub(crate) fn require_param<T: DeserializeOwned>(
    params: &Value,
    snake: &str,
    camel: &str,
) -> nameserv_core::Result<T> {
    let value = params
        .get(snake)
        .or_else(|| params.get(camel))
        .cloned()
        .ok_or_else(|| missing(snake))?;
    serde_json::from_value(value).map_err(|e| NameServerError::InvalidParams {
        message: format!("Invalid parameter {}: {}", snake, e),
    })
}

/// Service references travel as hex strings.
pub(crate) fn require_service_ref(params: &Value) -> nameserv_core::Result<ServiceRef> {
    let encoded = require_str_param(params, "service_ref", "serviceRef")?;
    ServiceRef::from_hex(&encoded).map_err(|e| NameServerError::InvalidParams {
        message: format!("serviceRef is not valid hex: {}", e),
    })
}

/// Up to four extra values; missing slots are empty.
pub(crate) fn get_extras(params: &Value) -> nameserv_core::Result<Extras> {
    let mut extras = Extras::default();
    let Some(values) = params.get("extras") else {
        return Ok(extras);
    };
    let values = values.as_array().ok_or_else(|| NameServerError::InvalidParams {
        message: "extras must be an array of strings".to_string(),
    })?;
    if values.len() > EXTRA_COUNT {
        return Err(NameServerError::InvalidParams {
            message: format!("At most {} extra values are allowed", EXTRA_COUNT),
        });
    }
    for (slot, value) in values.iter().enumerate() {
        extras[slot] = value
            .as_str()
            .ok_or_else(|| NameServerError::InvalidParams {
                message: "extras must be an array of strings".to_string(),
            })?
            .to_string();
    }
    Ok(extras)
}

fn missing(name: &str) -> NameServerError {
    NameServerError::InvalidParams {
        message: format!("Missing required parameter: {}", name),
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let JsonRpcRequest {
        method, params, id, ..
    } = request;
    let params = params.unwrap_or(Value::Object(Default::default()));

    debug!("RPC call: {}({:?})", method, params);

    // Core calls block on the tree lock, so keep them off the async workers
    let dispatched = tokio::task::spawn_blocking({
        let state = Arc::clone(&state);
        let method = method.clone();
        move || dispatch_method(&state, &method, &params)
    })
    .await;

    let response = match dispatched {
        Ok(Some(Ok(value))) => JsonRpcResponse::success(id, value),
        Ok(Some(Err(e))) => {
            log_failure(&method, &e);
            JsonRpcResponse::error(
                id,
                e.to_rpc_error_code(),
                e.to_string(),
                Some(json!({ "kind": e.kind_name() })),
            )
        }
        Ok(None) => {
            warn!("Unknown RPC method: {}", method);
            JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
                None,
            )
        }
        Err(join_err) => {
            error!("RPC handler for {} did not complete: {}", method, join_err);
            JsonRpcResponse::error(
                id,
                INTERNAL_ERROR,
                "Internal name server error".to_string(),
                Some(json!({ "kind": "Internal" })),
            )
        }
    };
    (StatusCode::OK, Json(response))
}

/// Clients rely on most failures (duplicate bind, missing path), so only
/// unexpected ones are worth an error log.
fn failure_level(kind: ErrorKind) -> Level {
    match kind {
        ErrorKind::Internal => Level::ERROR,
        ErrorKind::BadRequest => Level::WARN,
        ErrorKind::NotFound
        | ErrorKind::WrongType
        | ErrorKind::AlreadyExists
        | ErrorKind::IndexOutOfRange => Level::DEBUG,
    }
}

fn log_failure(method: &str, err: &NameServerError) {
    let level = failure_level(err.kind());
    if level == Level::ERROR {
        error!("RPC error for {}: {}", method, err);
    } else if level == Level::WARN {
        warn!("Rejected RPC {}: {}", method, err);
    } else {
        debug!("RPC {} failed: {}", method, err);
    }
}

/// Route a method name to its handler. `None` for unknown methods.
fn dispatch_method(
    state: &AppState,
    method: &str,
    params: &Value,
) -> Option<nameserv_core::Result<Value>> {
    let result = match method {
        // Lookup
        "bindingExists" => query::binding_exists(state, params),
        "scopeExists" => query::scope_exists(state, params),
        "getObject" => query::get_object(state, params),
        "queryNameInfo" => query::query_name_info(state, params),
        "queryNameInfo2" => query::query_name_info2(state, params),
        "queryScopeKeys" => query::query_scope_keys(state, params),
        "enumObjects" => query::enum_objects(state, params),
        "enumSubScopes" => query::enum_subscopes(state, params),
        "queryCookie" => query::query_cookie(state, params),
        "dump" => query::dump(state, params),

        // Bindings
        "bindObj" => binding::bind_obj(state, params),
        "bindObj2" => binding::bind_obj2(state, params),
        "bindObj3" => binding::bind_obj3(state, params),
        "rebindObjects" => binding::rebind_objects(state, params),
        "renewLeases" => binding::renew_leases(state, params),
        "removeBinding" => binding::remove_binding(state, params),
        "updateExtraVal" => binding::update_extra_val(state, params),

        // Scopes
        "createScope" => scope::create_scope(state, params),
        "createScopePath" => scope::create_scope_path(state, params),
        "removeScope" => scope::remove_scope(state, params),
        "clearScope" => scope::clear_scope(state, params),

        // Admin
        "adminStop" => admin::admin_stop(state, params),

        _ => return None,
    };
    Some(result)
}
