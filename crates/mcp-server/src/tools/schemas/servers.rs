use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListBinaryServersRequest {
    /// Force a discovery sweep before listing
    #[schemars(
        description = "Force a discovery sweep before listing (default: false; otherwise the last sweep is reused while fresh)."
    )]
    pub refresh: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectBinaryRequest {
    /// Full or partial filename, case-insensitive
    #[schemars(
        description = "Full or partial filename of a loaded binary (case-insensitive). Exact filename or basename matches rank first."
    )]
    pub filename: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BinaryInfoRequest {
    #[schemars(description = "Binary server id as returned by list_binary_servers (e.g. 'port_9009').")]
    pub binary_id: String,
}

/// Requests that only pick an instance.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct TargetRequest {
    #[schemars(description = "Binary server id (empty or omitted: default server, the lowest port).")]
    pub binary_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_may_be_omitted() {
        let request: ListBinaryServersRequest =
            serde_json::from_value(json!({})).expect("empty request");
        assert_eq!(request.refresh, None);

        let request: TargetRequest = serde_json::from_value(json!({})).expect("empty request");
        assert_eq!(request.binary_id, None);
    }

    #[test]
    fn filename_is_required() {
        assert!(serde_json::from_value::<SelectBinaryRequest>(json!({})).is_err());
    }
}
