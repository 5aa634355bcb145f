use super::super::{BinjaBridgeService, CallToolResult, ListEntitiesRequest, McpError};
use super::response::envelope;
use super::target_of;

pub(in crate::tools::dispatch) async fn list_entities(
    service: &BinjaBridgeService,
    request: ListEntitiesRequest,
) -> Result<CallToolResult, McpError> {
    let target = target_of(request.binary_id.as_deref());
    let page = service
        .bridge
        .list_entities(
            request.kind.trim(),
            request.offset,
            request.limit,
            request.query.as_deref().unwrap_or_default(),
            &target,
        )
        .await;
    Ok(envelope(&page))
}
