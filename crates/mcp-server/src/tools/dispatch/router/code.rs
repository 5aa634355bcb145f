use super::super::{BinjaBridgeService, CallToolResult, DecompileRequest, McpError, TargetRequest};
use super::response::from_result;
use super::target_of;

pub(in crate::tools::dispatch) async fn decompile_function(
    service: &BinjaBridgeService,
    request: DecompileRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let result = service.bridge.decompile(&request.name, &target).await;
    Ok(from_result("decompile_function", result))
}

pub(in crate::tools::dispatch) async fn overview(
    service: &BinjaBridgeService,
    request: TargetRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let result = service.bridge.overview(&target).await;
    Ok(from_result("overview", result))
}

pub(in crate::tools::dispatch) async fn get_binary_status(
    service: &BinjaBridgeService,
    request: TargetRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let result = service.bridge.binary_status(&target).await;
    Ok(from_result("get_binary_status", result))
}
