//! Operation-level facade over the registry, client and list cache.
//!
//! List reads always produce a [`ListEnvelope`] (failures included, and both are cached).
//! Every other operation returns the response fields without `ok`; the caller renders
//! `ok`/`error` once at its boundary.

use crate::cache::{CacheKey, TtlCache};
use crate::client::{BridgeClient, ResponseBody};
use crate::config::{BridgeConfig, PagingConfig};
use crate::envelope::{clamp_paging_with, normalize, Paging};
use crate::error::{BridgeError, Result};
use crate::params::{Params, Target};
use crate::registry::{InstanceRecord, Registry};
use crate::selector::{self, Selection};
use crate::transport::{ReqwestTransport, Transport};
use binja_protocol::{HealthReport, ListEnvelope};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type Fields = Map<String, Value>;

pub const MAX_READ_SIZE: i64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Methods,
    Classes,
    Segments,
    Imports,
    Exports,
    Data,
    Namespaces,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        Self::Methods,
        Self::Classes,
        Self::Segments,
        Self::Imports,
        Self::Exports,
        Self::Data,
        Self::Namespaces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Methods => "methods",
            Self::Classes => "classes",
            Self::Segments => "segments",
            Self::Imports => "imports",
            Self::Exports => "exports",
            Self::Data => "data",
            Self::Namespaces => "namespaces",
        }
    }
}

impl FromStr for EntityKind {
    type Err = BridgeError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(EntityKind::as_str).collect();
                BridgeError::validation(format!(
                    "Invalid kind. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryFormat {
    Hex,
    Bytes,
    Ascii,
    Hexdump,
}

impl MemoryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Bytes => "bytes",
            Self::Ascii => "ascii",
            Self::Hexdump => "hexdump",
        }
    }
}

impl fmt::Display for MemoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryFormat {
    type Err = BridgeError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "bytes" => Ok(Self::Bytes),
            "ascii" => Ok(Self::Ascii),
            "hexdump" => Ok(Self::Hexdump),
            _ => Err(BridgeError::validation(
                "Invalid format. Must be one of: hex, bytes, ascii, hexdump",
            )),
        }
    }
}

pub struct Bridge<T: Transport> {
    registry: Arc<Registry<T>>,
    client: BridgeClient<T>,
    cache: TtlCache<ListEnvelope>,
    paging: PagingConfig,
}

impl Bridge<ReqwestTransport> {
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(
            config.client.connect_timeout(),
            config.client.read_timeout(),
        )?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }
}

impl<T: Transport> Bridge<T> {
    pub fn with_transport(transport: Arc<T>, config: &BridgeConfig) -> Self {
        let registry = Arc::new(Registry::new(transport.clone(), config.discovery.clone()));
        let client = BridgeClient::new(registry.clone(), transport, &config.client);
        Self {
            registry,
            client,
            cache: TtlCache::new(config.cache.ttl(), config.cache.capacity),
            paging: config.paging,
        }
    }

    pub fn registry(&self) -> &Arc<Registry<T>> {
        &self.registry
    }

    pub fn paging(&self, offset: Option<i64>, limit: Option<i64>) -> Paging {
        clamp_paging_with(offset, limit, &self.paging)
    }

    /// Live instances, each merged with its `/binary/info` when that call succeeds.
    pub async fn list_servers(&self, refresh: bool) -> Vec<Value> {
        let servers = if refresh {
            self.registry.force_discover().await
        } else {
            self.registry.servers().await
        };

        let mut listed = Vec::with_capacity(servers.len());
        for record in servers.values() {
            let target = Target::Instance(record.id.clone());
            let info = self
                .client
                .get("binary/info", &Params::new(), &target)
                .await;
            listed.push(server_entry(record, info));
        }
        listed
    }

    pub async fn select_by_filename(&self, filename: &str) -> Result<Selection> {
        let servers = self.registry.servers().await;
        selector::select(&servers, filename)
    }

    pub async fn binary_info(&self, binary_id: &str) -> Result<Fields> {
        let binary_id = binary_id.trim();
        if binary_id.is_empty() {
            return Err(BridgeError::validation("binary_id is required"));
        }
        let server_info = self.registry.get_by_id(binary_id).await?;
        let target = Target::Instance(binary_id.to_string());
        let binary_info = self
            .client
            .get("binary/info", &Params::new(), &target)
            .await
            .map_err(|err| err.context("Failed to get binary info"))?;

        let mut fields = Fields::new();
        fields.insert("binary_id".into(), Value::String(binary_id.to_string()));
        fields.insert("server_info".into(), record_value(&server_info));
        fields.insert("binary_info".into(), binary_info.into_value());
        Ok(fields)
    }

    /// Never fails; an unreachable or unknown instance is reported in the body.
    pub async fn health(&self, target: &Target) -> HealthReport {
        let result = self.client.get("status", &Params::new(), target).await;
        let binary_id = target.label().to_string();
        match result {
            Ok(ResponseBody::Json(status @ (Value::String(_) | Value::Object(_)))) => HealthReport {
                ok: true,
                error: None,
                status: Some(status),
                binary_id,
            },
            Ok(_) => HealthReport {
                ok: true,
                error: None,
                status: None,
                binary_id,
            },
            Err(err) => HealthReport {
                ok: false,
                error: Some(err.to_string()),
                status: None,
                binary_id,
            },
        }
    }

    pub async fn list_entities(
        &self,
        kind: &str,
        offset: Option<i64>,
        limit: Option<i64>,
        query: &str,
        target: &Target,
    ) -> ListEnvelope {
        let kind = match kind.parse::<EntityKind>() {
            Ok(kind) => kind,
            Err(err) => return ListEnvelope::failure(err.to_string()),
        };
        let paging = self.paging(offset, limit);
        let mut extra = Params::new();
        extra.insert_non_blank("query", query);

        let path = if kind == EntityKind::Methods && extra.get("query").is_some() {
            "searchFunctions"
        } else {
            kind.as_str()
        };
        self.list_endpoint(path, paging, extra, target).await
    }

    pub async fn list_data(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
        query: &str,
        filter_type: &str,
        target: &Target,
    ) -> ListEnvelope {
        let paging = self.paging(offset, limit);
        let mut extra = Params::new();
        extra.insert_non_blank("query", query);
        extra.insert_non_blank("type", filter_type);

        let mut envelope = self
            .list_endpoint(EntityKind::Data.as_str(), paging, extra, target)
            .await;
        if envelope.ok {
            for item in envelope.items.iter_mut() {
                if let Value::Object(fields) = item {
                    fill_data_defaults(fields);
                }
            }
        }
        envelope
    }

    pub async fn data_item(&self, name: &str, address: &str, target: &Target) -> Result<Fields> {
        let mut params = Params::new();
        params.insert_non_blank("name", name);
        params.insert_non_blank("address", address);
        if params.is_empty() {
            return Err(BridgeError::validation(
                "Either name or address must be provided",
            ));
        }

        match self.client.get("data/item", &params, target).await? {
            ResponseBody::Json(Value::Object(fields)) => Ok(fields),
            other => Ok(Fields::from_iter([("data".to_string(), other.into_value())])),
        }
    }

    pub async fn read_memory(
        &self,
        address: &str,
        size: i64,
        format: &str,
        target: &Target,
    ) -> Result<Fields> {
        if address.trim().is_empty() {
            return Err(BridgeError::validation("Address is required"));
        }
        if !(1..=MAX_READ_SIZE).contains(&size) {
            return Err(BridgeError::validation(format!(
                "Size must be between 1 and {MAX_READ_SIZE} bytes"
            )));
        }
        let format: MemoryFormat = format.parse()?;

        let params = Params::new()
            .with("address", address.trim())
            .with("size", size)
            .with("format", format);
        let data = self.client.get("memory", &params, target).await?;

        let mut fields = Fields::new();
        fields.insert("address".into(), Value::String(address.to_string()));
        fields.insert("size".into(), json!(size));
        fields.insert("format".into(), Value::String(format.to_string()));
        fields.insert("data".into(), data.into_value());
        fields.insert("binary_id".into(), label(target));
        Ok(fields)
    }

    pub async fn data_references(
        &self,
        address: &str,
        pattern: &str,
        target: &Target,
    ) -> Result<Fields> {
        let mut params = Params::new();
        params.insert_non_blank("address", address);
        params.insert_non_blank("pattern", pattern);
        if params.is_empty() {
            return Err(BridgeError::validation(
                "Either address or pattern must be provided",
            ));
        }

        let data = self
            .client
            .get("data/references", &params, target)
            .await?
            .into_value();
        let mut fields = Fields::new();
        fields.insert("binary_id".into(), label(target));
        match data {
            Value::Array(references) => {
                fields.insert("references".into(), Value::Array(references));
            }
            Value::Object(found) => fields.extend(found),
            _ => {
                fields.insert("references".into(), Value::Array(Vec::new()));
            }
        }
        Ok(fields)
    }

    pub async fn decompile(&self, name: &str, target: &Target) -> Result<Fields> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BridgeError::validation("Function name cannot be empty"));
        }

        let code = match self
            .client
            .post("decompile", &Params::new(), name, target)
            .await?
        {
            ResponseBody::Json(Value::String(code)) => code,
            ResponseBody::Json(other) => other.to_string(),
            ResponseBody::Lines(lines) => lines.join("\n"),
        };

        let mut fields = Fields::new();
        fields.insert("code".into(), Value::String(code));
        fields.insert("binary_id".into(), label(target));
        Ok(fields)
    }

    pub async fn overview(&self, target: &Target) -> Result<Fields> {
        self.labeled_read("overview", "overview", target).await
    }

    pub async fn binary_status(&self, target: &Target) -> Result<Fields> {
        self.labeled_read("binary", "binary", target).await
    }

    async fn labeled_read(&self, path: &str, field: &str, target: &Target) -> Result<Fields> {
        let data = self.client.get(path, &Params::new(), target).await?;
        let mut fields = Fields::new();
        fields.insert(field.to_string(), data.into_value());
        fields.insert("binary_id".into(), label(target));
        Ok(fields)
    }

    /// Cached, normalized read of a paged list path.
    pub async fn list_endpoint(
        &self,
        path: &str,
        paging: Paging,
        extra: Params,
        target: &Target,
    ) -> ListEnvelope {
        let mut params = extra;
        params.insert("offset", paging.offset);
        params.insert("limit", paging.limit);

        let key = CacheKey::new(path, &params, target);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let envelope = match self.client.get(path, &params, target).await {
            Ok(body) => normalize(body.into_value(), paging.limit),
            Err(err) => ListEnvelope::failure(err.to_string()),
        };
        self.cache.insert(key, envelope.clone());
        envelope
    }
}

fn label(target: &Target) -> Value {
    Value::String(target.label().to_string())
}

fn record_value(record: &InstanceRecord) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

fn server_entry(record: &InstanceRecord, info: Result<ResponseBody>) -> Value {
    let mut entry = Fields::new();
    entry.insert("binary_id".into(), Value::String(record.id.clone()));
    entry.insert("port".into(), json!(record.port));
    entry.insert("url".into(), Value::String(record.url.clone()));
    entry.insert("last_seen_ms".into(), json!(record.last_seen_ms));

    match info {
        Ok(ResponseBody::Json(Value::Object(info))) => entry.extend(info),
        _ => {
            entry.insert("filename".into(), Value::String(record.filename.clone()));
            entry.insert(
                "display_name".into(),
                Value::String(record.display_name.clone()),
            );
            entry.insert("loaded".into(), Value::Bool(true));
        }
    }
    Value::Object(entry)
}

fn fill_data_defaults(item: &mut Fields) {
    let defaults = [
        ("name", json!("unnamed")),
        ("address", Value::Null),
        ("size", json!(0)),
        ("type", json!("unknown")),
    ];
    for (key, value) in defaults {
        item.entry(key).or_insert(value);
    }
}
