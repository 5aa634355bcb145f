use super::schemas::code::DecompileRequest;
use super::schemas::data::{
    DataItemRequest, DataReferencesRequest, ListDataRequest, ReadMemoryRequest,
};
use super::schemas::entities::ListEntitiesRequest;
use super::schemas::servers::{
    BinaryInfoRequest, ListBinaryServersRequest, SelectBinaryRequest, TargetRequest,
};
use binja_bridge::{Bridge, ReqwestTransport};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router, ErrorData as McpError};
use std::sync::Arc;

mod router;
mod service;

/// Binary Ninja bridge MCP service
#[derive(Clone)]
pub struct BinjaBridgeService {
    bridge: Arc<Bridge<ReqwestTransport>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BinjaBridgeService {
    #[tool(
        description = "List all available Binary Ninja MCP servers and their loaded binaries. Each entry carries the binary_id to pass to other tools."
    )]
    pub async fn list_binary_servers(
        &self,
        Parameters(request): Parameters<ListBinaryServersRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::servers::list_binary_servers(self, request).await
    }

    #[tool(
        description = "Select a binary server by full or partial filename (case-insensitive). Returns ranked matches and the selected binary_id."
    )]
    pub async fn select_binary_by_filename(
        &self,
        Parameters(request): Parameters<SelectBinaryRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::servers::select_binary_by_filename(self, request).await
    }

    #[tool(description = "Get detailed information about a specific binary server.")]
    pub async fn get_binary_info(
        &self,
        Parameters(request): Parameters<BinaryInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::servers::get_binary_info(self, request).await
    }

    #[tool(
        description = "Cheap health probe. Checks the given binary server (or the default one) and reports reachability and status without failing the call."
    )]
    pub async fn health(
        &self,
        Parameters(request): Parameters<TargetRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::servers::health(self, request).await
    }

    #[tool(
        description = "List entities with paging and an optional substring filter. Valid kinds: methods, classes, segments, imports, exports, data, namespaces. Returns {ok, error, items, hasMore}."
    )]
    pub async fn list_entities(
        &self,
        Parameters(request): Parameters<ListEntitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::entities::list_entities(self, request).await
    }

    #[tool(
        description = "List data items (variables, constants, arrays) with paging and optional name/type filters. Items always carry name, address, size and type."
    )]
    pub async fn list_data(
        &self,
        Parameters(request): Parameters<ListDataRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::data::list_data(self, request).await
    }

    #[tool(
        description = "Get detailed information about one data item by name or address: type, size, value, cross-references, section."
    )]
    pub async fn get_data_item(
        &self,
        Parameters(request): Parameters<DataItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::data::get_data_item(self, request).await
    }

    #[tool(
        description = "Read up to 4096 bytes of raw memory at an address, formatted as hex, bytes, ascii or hexdump."
    )]
    pub async fn read_memory(
        &self,
        Parameters(request): Parameters<ReadMemoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::data::read_memory(self, request).await
    }

    #[tool(
        description = "Find code locations referencing a data address, or occurrences of a hex byte pattern."
    )]
    pub async fn search_data_references(
        &self,
        Parameters(request): Parameters<DataReferencesRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::data::search_data_references(self, request).await
    }

    #[tool(description = "Decompile a function by exact name.")]
    pub async fn decompile_function(
        &self,
        Parameters(request): Parameters<DecompileRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::code::decompile_function(self, request).await
    }

    #[tool(description = "Get an overview of the loaded binary.")]
    pub async fn overview(
        &self,
        Parameters(request): Parameters<TargetRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::code::overview(self, request).await
    }

    #[tool(description = "Get the current binary status and basic information.")]
    pub async fn get_binary_status(
        &self,
        Parameters(request): Parameters<TargetRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::code::get_binary_status(self, request).await
    }
}
