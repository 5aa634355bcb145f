//! Bridge configuration.
//!
//! Defaults mirror the single-host layout where the Binary Ninja plugin assigns one port per
//! loaded binary starting at 9009. A TOML file (`BINJA_BRIDGE_CONFIG`) can replace any section,
//! and individual `BINJA_*` variables override single fields on top of that.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "BINJA_BRIDGE_CONFIG";

const MAX_SERVERS_CEILING: u16 = 256;
const MAX_IN_FLIGHT_CEILING: usize = 256;
const PROBE_CONCURRENCY_CEILING: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub discovery: DiscoveryConfig,
    pub client: ClientConfig,
    pub cache: CacheConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Scheme and host shared by every instance, without port.
    pub base_url: String,
    pub base_port: u16,
    pub max_servers: u16,
    /// Minimum time between two sweeps.
    pub interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub probe_concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            base_port: 9009,
            max_servers: 10,
            interval_ms: 30_000,
            probe_timeout_ms: 2_000,
            probe_concurrency: 8,
        }
    }
}

impl DiscoveryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Candidate ports, `[base_port, base_port + max_servers)`, stopping at `u16::MAX`.
    pub fn ports(&self) -> impl Iterator<Item = u16> {
        let start = u32::from(self.base_port);
        let end = (start + u32::from(self.max_servers)).min(u32::from(u16::MAX) + 1);
        (start..end).filter_map(|port| u16::try_from(port).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Additional attempts after the first one, for transport failures only.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_in_flight: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1_000,
            read_timeout_ms: 8_000,
            max_retries: 2,
            retry_backoff_ms: 200,
            max_in_flight: 16,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_ms: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 3_000,
            capacity: 1_024,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: crate::envelope::DEFAULT_LIMIT,
            max_limit: crate::envelope::MAX_LIMIT,
        }
    }
}

impl BridgeConfig {
    /// Defaults, then the optional TOML file, then `BINJA_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BridgeError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| BridgeError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(raw).map_err(|err| BridgeError::Config(err.to_string()))?;
        config.sanitize();
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let discovery = &mut self.discovery;
        if let Some(url) = lookup("BINJA_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
        {
            discovery.base_url = url;
        }
        override_with(&lookup, "BINJA_BASE_PORT", &mut discovery.base_port);
        override_with(&lookup, "BINJA_MAX_SERVERS", &mut discovery.max_servers);
        override_with(&lookup, "BINJA_DISCOVERY_INTERVAL_MS", &mut discovery.interval_ms);
        override_with(&lookup, "BINJA_PROBE_TIMEOUT_MS", &mut discovery.probe_timeout_ms);

        let client = &mut self.client;
        override_with(&lookup, "BINJA_CONNECT_TIMEOUT_MS", &mut client.connect_timeout_ms);
        override_with(&lookup, "BINJA_READ_TIMEOUT_MS", &mut client.read_timeout_ms);
        override_with(&lookup, "BINJA_MAX_RETRIES", &mut client.max_retries);
        override_with(&lookup, "BINJA_RETRY_BACKOFF_MS", &mut client.retry_backoff_ms);
        override_with(&lookup, "BINJA_MAX_IN_FLIGHT", &mut client.max_in_flight);

        override_with(&lookup, "BINJA_CACHE_TTL_MS", &mut self.cache.ttl_ms);
        override_with(&lookup, "BINJA_CACHE_CAPACITY", &mut self.cache.capacity);
    }

    fn sanitize(&mut self) {
        self.discovery.base_url = self.discovery.base_url.trim_end_matches('/').to_string();
        self.discovery.max_servers = self.discovery.max_servers.clamp(1, MAX_SERVERS_CEILING);
        self.discovery.probe_concurrency = self
            .discovery
            .probe_concurrency
            .clamp(1, PROBE_CONCURRENCY_CEILING);
        self.client.max_in_flight = self.client.max_in_flight.clamp(1, MAX_IN_FLIGHT_CEILING);
        self.cache.capacity = self.cache.capacity.max(1);
        self.paging.max_limit = self.paging.max_limit.max(1);
        self.paging.default_limit = self.paging.default_limit.clamp(1, self.paging.max_limit);
    }
}

fn parse_value<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
}

fn override_with<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match parse_value::<T>(Some(&raw)) {
        Some(value) => *slot = value,
        None => log::warn!("Ignoring {key}={raw:?}: not a valid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_plugin_port_layout() {
        let config = BridgeConfig::default();
        assert_eq!(config.discovery.base_port, 9009);
        assert_eq!(config.discovery.ports().collect::<Vec<_>>().len(), 10);
        assert_eq!(config.client.max_retries, 2);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3));
        assert_eq!(config.paging.max_limit, 1000);
    }

    #[test]
    fn env_overrides_replace_single_fields() {
        let mut config = BridgeConfig::default();
        config.apply_overrides(lookup_from(&[
            ("BINJA_BASE_URL", "http://10.0.0.5/"),
            ("BINJA_BASE_PORT", "19009"),
            ("BINJA_MAX_RETRIES", "5"),
            ("BINJA_CACHE_TTL_MS", " 500 "),
        ]));
        assert_eq!(config.discovery.base_url, "http://10.0.0.5");
        assert_eq!(config.discovery.base_port, 19009);
        assert_eq!(config.client.max_retries, 5);
        assert_eq!(config.cache.ttl_ms, 500);
        assert_eq!(config.client.read_timeout_ms, 8_000);
    }

    #[test]
    fn unparseable_env_values_are_ignored() {
        let mut config = BridgeConfig::default();
        config.apply_overrides(lookup_from(&[
            ("BINJA_BASE_PORT", "not-a-port"),
            ("BINJA_MAX_SERVERS", "-3"),
        ]));
        assert_eq!(config.discovery.base_port, 9009);
        assert_eq!(config.discovery.max_servers, 10);
    }

    #[test]
    fn toml_sections_are_partial() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [discovery]
            base_port = 7000
            max_servers = 1000

            [paging]
            max_limit = 50
            default_limit = 80
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.discovery.base_port, 7000);
        assert_eq!(config.discovery.max_servers, 256);
        assert_eq!(config.discovery.base_url, "http://localhost");
        assert_eq!(config.paging.default_limit, 50);
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = BridgeConfig::from_toml_str("discovery = 3").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[cache]\nttl_ms = 250\n").expect("write config");
        let config = BridgeConfig::from_file(&path).expect("load config");
        assert_eq!(config.cache.ttl_ms, 250);

        let missing = BridgeConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(missing.to_string().contains("failed to read"));
    }

    #[test]
    fn port_range_stops_at_u16_max() {
        let discovery = DiscoveryConfig {
            base_port: u16::MAX - 1,
            max_servers: 10,
            ..DiscoveryConfig::default()
        };
        assert_eq!(discovery.ports().collect::<Vec<_>>(), vec![u16::MAX - 1, u16::MAX]);
    }
}
