mod bridge;
mod cache;
mod client;
mod config;
mod envelope;
mod error;
mod params;
mod registry;
mod selector;
mod transport;

#[cfg(test)]
mod test_support;

pub use bridge::{Bridge, EntityKind, Fields, MemoryFormat, MAX_READ_SIZE};
pub use cache::{CacheKey, TtlCache};
pub use client::{BridgeClient, ResponseBody, RetryPolicy};
pub use config::{
    BridgeConfig, CacheConfig, ClientConfig, DiscoveryConfig, PagingConfig, CONFIG_PATH_ENV,
};
pub use envelope::{
    clamp_paging, clamp_paging_with, is_truthy, normalize, BackendPayload, Paging, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use error::{BridgeError, Result};
pub use params::{Params, Target};
pub use registry::{instance_id_for_port, InstanceMap, InstanceRecord, Registry};
pub use selector::{select, Selection};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
