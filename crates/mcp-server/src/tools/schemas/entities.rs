use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListEntitiesRequest {
    /// Entity kind
    #[schemars(
        description = "Entity kind: methods, classes, segments, imports, exports, data, or namespaces."
    )]
    pub kind: String,

    #[schemars(description = "Starting index for pagination (default: 0).")]
    pub offset: Option<i64>,

    #[schemars(description = "Maximum number of items (default: 100, max: 1000).")]
    pub limit: Option<i64>,

    /// Substring filter (methods use the engine's function search)
    #[schemars(
        description = "Optional substring filter. For 'methods' this uses the engine's function search."
    )]
    pub query: Option<String>,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}
