use super::BinjaBridgeService;
use anyhow::{Context, Result};
use binja_bridge::{Bridge, BridgeConfig, ReqwestTransport};
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};
use std::sync::Arc;

impl BinjaBridgeService {
    pub fn new(bridge: Arc<Bridge<ReqwestTransport>>) -> Self {
        Self {
            bridge,
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let bridge = Bridge::from_config(config).context("failed to build bridge")?;
        Ok(Self::new(Arc::new(bridge)))
    }

    pub fn bridge(&self) -> &Bridge<ReqwestTransport> {
        &self.bridge
    }
}

fn tool_instructions() -> String {
    [
        "Routes analysis calls to running Binary Ninja instances, one per loaded binary.",
        "Start with list_binary_servers or select_binary_by_filename to obtain a binary_id.",
        "Every other tool takes an optional binary_id; omit it to use the default server (lowest port).",
        "List tools page with offset/limit and return {ok, error, items, hasMore}.",
    ]
    .join("\n")
}

#[tool_handler]
impl ServerHandler for BinjaBridgeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(tool_instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
