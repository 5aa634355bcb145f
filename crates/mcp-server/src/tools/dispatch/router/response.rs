//! Rendering of bridge results into tool results.
//!
//! Every payload is a JSON object with an `ok` flag, sent both as pretty text content and as
//! structured content. `ok: false` results are flagged as tool errors.

use binja_bridge::{BridgeError, Fields};
use binja_protocol::{serialize_json, ListEnvelope};
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::{json, Value};

pub(in crate::tools::dispatch) fn json_result(value: Value, is_error: bool) -> CallToolResult {
    let text = serialize_json(&value).unwrap_or_else(|_| value.to_string());
    let mut result = if is_error {
        CallToolResult::error(vec![Content::text(text)])
    } else {
        CallToolResult::success(vec![Content::text(text)])
    };
    result.structured_content = Some(value);
    result
}

/// `{ok: true, ...fields}`.
pub(in crate::tools::dispatch) fn success(fields: Fields) -> CallToolResult {
    let mut payload = Fields::new();
    payload.insert("ok".into(), Value::Bool(true));
    payload.extend(fields);
    json_result(Value::Object(payload), false)
}

pub(in crate::tools::dispatch) fn failure(tool: &str, err: &BridgeError) -> CallToolResult {
    log::warn!("{tool} failed: {err}");
    let mut payload = json!({ "ok": false, "error": err.to_string() });
    if let BridgeError::NoMatch { available, .. } = err {
        payload["available_binaries"] = json!(available);
    }
    json_result(payload, true)
}

pub(in crate::tools::dispatch) fn from_result(
    tool: &str,
    result: binja_bridge::Result<Fields>,
) -> CallToolResult {
    match result {
        Ok(fields) => success(fields),
        Err(err) => failure(tool, &err),
    }
}

pub(in crate::tools::dispatch) fn envelope(envelope: &ListEnvelope) -> CallToolResult {
    structured(envelope, !envelope.ok)
}

pub(in crate::tools::dispatch) fn structured<T: Serialize>(
    payload: &T,
    is_error: bool,
) -> CallToolResult {
    match serde_json::to_value(payload) {
        Ok(value) => json_result(value, is_error),
        Err(err) => json_result(
            json!({ "ok": false, "error": format!("failed to serialize response: {err}") }),
            true,
        ),
    }
}
