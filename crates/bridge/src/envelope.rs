//! Paging clamps and normalization of backend list payloads into [`ListEnvelope`].

use crate::config::PagingConfig;
use binja_protocol::ListEnvelope;
use serde_json::Value;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub offset: u64,
    pub limit: u64,
}

/// `offset = max(0, offset)`, `limit = min(max_limit, max(1, limit))`.
///
/// A missing or zero value falls back to the default (0 for offset, `default_limit` for limit).
pub fn clamp_paging_with(offset: Option<i64>, limit: Option<i64>, config: &PagingConfig) -> Paging {
    let offset = offset.unwrap_or(0).max(0).unsigned_abs();
    let limit = match limit {
        None | Some(0) => config.default_limit as i64,
        Some(value) => value,
    };
    let limit = limit.max(1).unsigned_abs().min(config.max_limit);
    Paging { offset, limit }
}

pub fn clamp_paging(offset: Option<i64>, limit: Option<i64>) -> Paging {
    clamp_paging_with(offset, limit, &PagingConfig::default())
}

/// Shape of a backend list payload, decided once.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendPayload {
    /// `{"items": [...], "hasMore": bool}`: the backend reports continuation itself.
    Envelope { items: Vec<Value>, has_more: bool },
    Sequence(Vec<Value>),
    Scalar(Value),
}

impl BackendPayload {
    pub fn classify(payload: Value) -> Self {
        match payload {
            Value::Object(mut map) if map.contains_key("items") => {
                let items = match map.remove("items") {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => vec![other],
                };
                let has_more = map.get("hasMore").is_some_and(is_truthy);
                Self::Envelope { items, has_more }
            }
            Value::Array(items) => Self::Sequence(items),
            other => Self::Scalar(other),
        }
    }

    /// A bare sequence is assumed to continue when it fills the requested page.
    pub fn into_envelope(self, limit: u64) -> ListEnvelope {
        match self {
            Self::Envelope { items, has_more } => ListEnvelope::page(items, has_more),
            Self::Sequence(items) => {
                let has_more = items.len() as u64 >= limit;
                ListEnvelope::page(items, has_more)
            }
            Self::Scalar(value) => ListEnvelope::page(vec![value], false),
        }
    }
}

pub fn normalize(payload: Value, limit: u64) -> ListEnvelope {
    BackendPayload::classify(payload).into_envelope(limit)
}

/// Loose truthiness for backend flags (`loaded`, `hasMore`) that are not always booleans.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(values) => !values.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
