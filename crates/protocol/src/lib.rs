use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used in responses when a call was routed to the default instance.
pub const DEFAULT_TARGET_LABEL: &str = "default";

/// Uniform result of every list-shaped read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope {
    pub ok: bool,
    pub error: Option<String>,
    pub items: Vec<Value>,
    pub has_more: bool,
}

impl ListEnvelope {
    pub fn page(items: Vec<Value>, has_more: bool) -> Self {
        Self {
            ok: true,
            error: None,
            items,
            has_more,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            items: Vec::new(),
            has_more: false,
        }
    }
}

/// One candidate produced by filename selection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SelectionMatch {
    pub binary_id: String,
    pub filename: String,
    pub port: u16,
    pub exact_match: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct HealthReport {
    pub ok: bool,
    pub error: Option<String>,
    /// Only string or object status payloads are reported.
    pub status: Option<Value>,
    pub binary_id: String,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
