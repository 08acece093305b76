//! Administrative handlers.

use crate::server::AppState;
use serde_json::{json, Value};
use tracing::info;

/// Ask the server process to shut down gracefully.
pub fn admin_stop(state: &AppState, _params: &Value) -> nameserv_core::Result<Value> {
    info!("Stop requested over RPC");
    state.shutdown.notify_one();
    Ok(json!({ "status": "shutting_down" }))
}
