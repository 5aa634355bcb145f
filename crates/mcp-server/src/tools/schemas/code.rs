use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DecompileRequest {
    #[schemars(description = "Exact function name to decompile.")]
    pub name: String,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}
