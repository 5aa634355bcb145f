//! Discovery of live engine instances.
//!
//! Each sweep probes `GET /status` on every candidate port and builds a fresh id → record map.
//! The map is published as one `Arc` swap, so readers either see the previous sweep or the new
//! one, never a partial set. Instances missing from a sweep are simply gone.

use crate::config::DiscoveryConfig;
use crate::envelope::is_truthy;
use crate::error::{BridgeError, Result};
use crate::params::Target;
use crate::transport::{HttpRequest, Transport};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex as TokioMutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;

pub type InstanceMap = BTreeMap<String, InstanceRecord>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRecord {
    pub id: String,
    pub url: String,
    pub port: u16,
    /// Filename reported by the instance (`"unknown"` when absent).
    pub filename: String,
    pub display_name: String,
    pub last_seen_ms: u64,
    pub status: Value,
}

pub fn instance_id_for_port(port: u16) -> String {
    format!("port_{port}")
}

fn unix_ms(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn basename(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(path)
}

struct RegistryState {
    instances: Arc<InstanceMap>,
    last_sweep: Option<Instant>,
}

pub struct Registry<T: Transport> {
    transport: Arc<T>,
    config: DiscoveryConfig,
    state: Mutex<RegistryState>,
    // Serializes sweeps so concurrent stale readers trigger a single one.
    sweep_gate: TokioMutex<()>,
}

impl<T: Transport> Registry<T> {
    pub fn new(transport: Arc<T>, config: DiscoveryConfig) -> Self {
        Self {
            transport,
            config,
            state: Mutex::new(RegistryState {
                instances: Arc::new(InstanceMap::new()),
                last_sweep: None,
            }),
            sweep_gate: TokioMutex::new(()),
        }
    }

    fn is_stale(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.last_sweep {
            None => true,
            Some(at) => at.elapsed() >= self.config.interval(),
        }
    }

    /// Current snapshot without triggering discovery.
    pub fn snapshot(&self) -> Arc<InstanceMap> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .instances
            .clone()
    }

    /// Sweeps unless the last sweep is younger than the configured interval.
    pub async fn discover(&self) {
        if !self.is_stale() {
            return;
        }
        let _gate = self.sweep_gate.lock().await;
        if !self.is_stale() {
            return;
        }
        self.sweep().await;
    }

    /// Sweeps regardless of the interval.
    pub async fn force_discover(&self) -> Arc<InstanceMap> {
        let _gate = self.sweep_gate.lock().await;
        self.sweep().await
    }

    pub async fn servers(&self) -> Arc<InstanceMap> {
        self.discover().await;
        self.snapshot()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<InstanceRecord> {
        self.discover().await;
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(id.to_string()))
    }

    /// The live instance with the lowest port.
    pub async fn get_default(&self) -> Result<InstanceRecord> {
        self.discover().await;
        self.snapshot()
            .values()
            .min_by_key(|record| record.port)
            .cloned()
            .ok_or(BridgeError::NoServersAvailable)
    }

    pub async fn resolve(&self, target: &Target) -> Result<InstanceRecord> {
        match target {
            Target::Default => self.get_default().await,
            Target::Instance(id) => self.get_by_id(id).await,
        }
    }

    async fn sweep(&self) -> Arc<InstanceMap> {
        let started = Instant::now();
        log::info!(
            "Discovering Binary Ninja MCP servers on ports {}..{}",
            self.config.base_port,
            u32::from(self.config.base_port) + u32::from(self.config.max_servers)
        );

        let found = Arc::new(self.probe_all().await);
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.instances = found.clone();
            state.last_sweep = Some(started);
        }

        log::info!("Discovery complete. Found {} active servers.", found.len());
        found
    }

    async fn probe_all(&self) -> InstanceMap {
        let limiter = Arc::new(Semaphore::new(self.config.probe_concurrency.max(1)));
        let timeout = self.config.probe_timeout();
        let mut probes = JoinSet::new();

        for port in self.config.ports() {
            let transport = self.transport.clone();
            let limiter = limiter.clone();
            let url = format!("{}:{port}", self.config.base_url);
            probes.spawn(async move {
                let _permit = limiter.acquire_owned().await.ok()?;
                probe(transport.as_ref(), port, url, timeout).await
            });
        }

        let seen_at = unix_ms(SystemTime::now());
        let mut found = InstanceMap::new();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok(Some(live)) => {
                    let id = instance_id_for_port(live.port);
                    let display_name = basename(&live.filename).to_string();
                    found.insert(
                        id.clone(),
                        InstanceRecord {
                            id,
                            url: live.url,
                            port: live.port,
                            filename: live.filename,
                            display_name,
                            last_seen_ms: seen_at,
                            status: live.status,
                        },
                    );
                }
                Ok(None) => {}
                Err(err) => log::debug!("Discovery probe task failed: {err}"),
            }
        }
        found
    }
}

struct LiveInstance {
    url: String,
    port: u16,
    filename: String,
    status: Value,
}

async fn probe<T: Transport>(
    transport: &T,
    port: u16,
    url: String,
    timeout: Duration,
) -> Option<LiveInstance> {
    let request = HttpRequest::get(format!("{url}/status")).with_timeout(timeout);
    let response = match transport.send(request).await {
        Ok(response) => response,
        Err(err) => {
            log::debug!("No server on port {port}: {err}");
            return None;
        }
    };
    if !response.is_success() {
        log::debug!("Port {port} answered /status with {}", response.status);
        return None;
    }

    let status: Value = serde_json::from_str(&response.body).ok()?;
    if !status.get("loaded").is_some_and(is_truthy) {
        return None;
    }

    let filename = status
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    log::info!("Found server at {url}: {filename}");
    Some(LiveInstance {
        url,
        port,
        filename,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_response, loaded_status, text_response, ScriptedTransport};
    use serde_json::json;

    fn discovery(max_servers: u16) -> DiscoveryConfig {
        DiscoveryConfig {
            base_port: 9009,
            max_servers,
            interval_ms: 30_000,
            ..DiscoveryConfig::default()
        }
    }

    fn registry(transport: &Arc<ScriptedTransport>, max_servers: u16) -> Registry<ScriptedTransport> {
        Registry::new(transport.clone(), discovery(max_servers))
    }

    #[tokio::test]
    async fn only_loaded_instances_are_live() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("/bins/a.exe")));
        transport.respond(
            9010,
            "/status",
            Ok(json_response(200, json!({ "loaded": false, "filename": "idle" }))),
        );
        transport.respond(9011, "/status", Ok(text_response(503, "busy")));
        transport.respond(9012, "/status", Ok(text_response(200, "not json")));

        let registry = registry(&transport, 5);
        let servers = registry.servers().await;

        assert_eq!(servers.keys().collect::<Vec<_>>(), vec!["port_9009"]);
        let record = &servers["port_9009"];
        assert_eq!(record.url, "http://localhost:9009");
        assert_eq!(record.filename, "/bins/a.exe");
        assert_eq!(record.display_name, "a.exe");
        assert_eq!(record.status["loaded"], json!(true));
    }

    #[tokio::test]
    async fn missing_filename_is_reported_as_unknown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(json_response(200, json!({ "loaded": 1 }))));
        let record = registry(&transport, 1)
            .get_by_id("port_9009")
            .await
            .expect("live instance");
        assert_eq!(record.filename, "unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_are_rate_limited_by_interval() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("a.exe")));
        let registry = registry(&transport, 2);

        registry.discover().await;
        registry.discover().await;
        let _ = registry.get_default().await;
        assert_eq!(transport.call_count(9009, "/status"), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        registry.discover().await;
        assert_eq!(transport.call_count(9009, "/status"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn instance_that_stops_responding_disappears_next_sweep() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("a.exe")));
        transport.respond(9010, "/status", Ok(loaded_status("b.exe")));
        let registry = registry(&transport, 2);

        assert!(registry.get_by_id("port_9010").await.is_ok());

        transport.clear(9010, "/status");
        tokio::time::advance(Duration::from_secs(31)).await;

        let servers = registry.servers().await;
        assert!(!servers.contains_key("port_9010"));
        assert_eq!(
            registry.get_by_id("port_9010").await,
            Err(BridgeError::NotFound("port_9010".to_string()))
        );
    }

    #[tokio::test]
    async fn snapshots_are_immutable_after_resweep() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("a.exe")));
        let registry = registry(&transport, 1);

        let before = registry.servers().await;
        transport.clear(9009, "/status");
        let after = registry.force_discover().await;

        assert_eq!(before.len(), 1);
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn default_is_lowest_port() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9017, "/status", Ok(loaded_status("z.exe")));
        transport.respond(9011, "/status", Ok(loaded_status("m.exe")));
        transport.respond(9014, "/status", Ok(loaded_status("a.exe")));
        let registry = registry(&transport, 10);

        let default = registry.get_default().await.expect("default instance");
        assert_eq!(default.id, "port_9011");
        assert_eq!(
            registry.resolve(&Target::Default).await.map(|r| r.port),
            Ok(9011)
        );
    }

    #[tokio::test]
    async fn empty_sweep_has_no_default() {
        let transport = Arc::new(ScriptedTransport::new());
        let registry = registry(&transport, 3);
        assert_eq!(
            registry.get_default().await,
            Err(BridgeError::NoServersAvailable)
        );
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn concurrent_stale_readers_share_one_sweep() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("a.exe")));
        let registry = Arc::new(registry(&transport, 1));

        let mut readers = JoinSet::new();
        for _ in 0..8 {
            let registry = registry.clone();
            readers.spawn(async move { registry.get_default().await });
        }
        while let Some(result) = readers.join_next().await {
            assert!(result.expect("reader task").is_ok());
        }
        assert_eq!(transport.call_count(9009, "/status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn discovery_respects_probe_concurrency() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(9009, "/status", Ok(loaded_status("a.exe")));
        transport.respond(9013, "/status", Ok(loaded_status("b.exe")));
        transport.set_latency(Duration::from_millis(100));
        let registry = Registry::new(
            transport.clone(),
            DiscoveryConfig {
                probe_concurrency: 2,
                ..discovery(6)
            },
        );

        let started = Instant::now();
        let servers = registry.force_discover().await;

        assert_eq!(servers.len(), 2);
        assert_eq!(transport.calls().len(), 6);
        assert_eq!(transport.peak_in_flight(), 2);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("/tmp/bins/a.exe"), "a.exe");
        assert_eq!(basename("C:\\bins\\b.dll"), "b.dll");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(basename("dir/"), "dir/");
    }
}
