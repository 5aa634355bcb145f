use super::super::{
    BinaryInfoRequest, BinjaBridgeService, CallToolResult, ListBinaryServersRequest, McpError,
    SelectBinaryRequest, TargetRequest,
};
use super::response::{failure, from_result, json_result, structured};
use super::target_of;
use serde_json::json;

pub(in crate::tools::dispatch) async fn list_binary_servers(
    service: &BinjaBridgeService,
    request: ListBinaryServersRequest,
) -> Result<CallToolResult, McpError> {
    let servers = service
        .bridge
        .list_servers(request.refresh.unwrap_or(false))
        .await;
    let count = servers.len();
    Ok(json_result(
        json!({ "ok": true, "servers": servers, "count": count }),
        false,
    ))
}

pub(in crate::tools::dispatch) async fn select_binary_by_filename(
    service: &BinjaBridgeService,
    request: SelectBinaryRequest,
) -> Result<CallToolResult, McpError> {
    match service.bridge.select_by_filename(&request.filename).await {
        Ok(selection) => Ok(json_result(
            json!({
                "ok": true,
                "message": format!(
                    "Found {} match(es) for '{}'",
                    selection.matches.len(),
                    request.filename
                ),
                "matches": selection.matches,
                "selected": selection.selected,
            }),
            false,
        )),
        Err(err) => Ok(failure("select_binary_by_filename", &err)),
    }
}

pub(in crate::tools::dispatch) async fn get_binary_info(
    service: &BinjaBridgeService,
    request: BinaryInfoRequest,
) -> Result<CallToolResult, McpError> {
    let result = service.bridge.binary_info(&request.binary_id).await;
    Ok(from_result("get_binary_info", result))
}

/// Never a tool error: failures are part of the report.
pub(in crate::tools::dispatch) async fn health(
    service: &BinjaBridgeService,
    request: TargetRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let report = service.bridge.health(&target).await;
    Ok(structured(&report, false))
}
