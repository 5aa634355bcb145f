use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDataRequest {
    #[schemars(description = "Starting index for pagination (default: 0).")]
    pub offset: Option<i64>,

    #[schemars(description = "Maximum number of items (default: 100, max: 1000).")]
    pub limit: Option<i64>,

    #[schemars(description = "Optional substring filter for data item names.")]
    pub query: Option<String>,

    /// Data type filter
    #[schemars(
        description = "Optional data type filter (e.g. 'array', 'string', 'struct', 'global')."
    )]
    pub filter_type: Option<String>,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DataItemRequest {
    #[schemars(description = "Name of the data item. Either name or address is required.")]
    pub name: Option<String>,

    #[schemars(description = "Address of the data item as a hex string (e.g. '0x401000').")]
    pub address: Option<String>,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadMemoryRequest {
    #[schemars(description = "Start address as a hex string (e.g. '0x401000').")]
    pub address: String,

    #[schemars(description = "Number of bytes to read (1..=4096).")]
    pub size: i64,

    /// Output format
    #[schemars(
        description = "Output format: 'hex' (default), 'bytes', 'ascii' (non-printable as dots), or 'hexdump'."
    )]
    pub format: Option<String>,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DataReferencesRequest {
    #[schemars(description = "Address of the data item to find references to.")]
    pub address: Option<String>,

    #[schemars(description = "Byte pattern to search for, as a hex string.")]
    pub pattern: Option<String>,

    #[schemars(description = "Binary server id (empty or omitted: default server).")]
    pub binary_id: Option<String>,
}
