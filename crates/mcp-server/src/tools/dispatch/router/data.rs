use super::super::{
    BinjaBridgeService, CallToolResult, DataItemRequest, DataReferencesRequest, ListDataRequest,
    McpError, ReadMemoryRequest,
};
use super::response::{envelope, from_result};
use super::target_of;

pub(in crate::tools::dispatch) async fn list_data(
    service: &BinjaBridgeService,
    request: ListDataRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let page = service
        .bridge
        .list_data(
            request.offset,
            request.limit,
            request.query.as_deref().unwrap_or_default(),
            request.filter_type.as_deref().unwrap_or_default(),
            &target,
        )
        .await;
    Ok(envelope(&page))
}

pub(in crate::tools::dispatch) async fn get_data_item(
    service: &BinjaBridgeService,
    request: DataItemRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let result = service
        .bridge
        .data_item(
            request.name.as_deref().unwrap_or_default(),
            request.address.as_deref().unwrap_or_default(),
            &target,
        )
        .await;
    Ok(from_result("get_data_item", result))
}

pub(in crate::tools::dispatch) async fn read_memory(
    service: &BinjaBridgeService,
    request: ReadMemoryRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let format = request
        .format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or("hex");
    let result = service
        .bridge
        .read_memory(&request.address, request.size, format, &target)
        .await;
    Ok(from_result("read_memory", result))
}

pub(in crate::tools::dispatch) async fn search_data_references(
    service: &BinjaBridgeService,
    request: DataReferencesRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let result = service
        .bridge
        .data_references(
            request.address.as_deref().unwrap_or_default(),
            request.pattern.as_deref().unwrap_or_default(),
            &target,
        )
        .await;
    Ok(from_result("search_data_references", result))
}
