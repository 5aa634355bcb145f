//! Routed requests to engine instances.
//!
//! Transport failures are retried with linear backoff; an HTTP error status is returned as-is
//! on the first attempt. Concurrency across all instances is bounded by one semaphore.

use crate::config::ClientConfig;
use crate::error::{BridgeError, Result};
use crate::params::{Params, Target};
use crate::registry::Registry;
use crate::transport::{HttpRequest, Method, Transport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.retry_backoff(),
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff_base.saturating_mul(retry)
    }
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// Non-JSON body, trimmed and split into lines.
    Lines(Vec<String>),
}

impl ResponseBody {
    pub fn decode(body: &str) -> Self {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return Self::Json(value);
        }
        let trimmed = body.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return Self::Json(value);
            }
        }
        Self::Lines(trimmed.lines().map(str::to_string).collect())
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Lines(lines) => Value::Array(lines.into_iter().map(Value::String).collect()),
        }
    }
}

pub struct BridgeClient<T: Transport> {
    registry: Arc<Registry<T>>,
    transport: Arc<T>,
    policy: RetryPolicy,
    in_flight: Arc<Semaphore>,
}

impl<T: Transport> BridgeClient<T> {
    pub fn new(registry: Arc<Registry<T>>, transport: Arc<T>, config: &ClientConfig) -> Self {
        Self {
            registry,
            transport,
            policy: RetryPolicy::from_config(config),
            in_flight: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        }
    }

    pub async fn get(&self, path: &str, params: &Params, target: &Target) -> Result<ResponseBody> {
        self.request(Method::Get, path, params, None, target).await
    }

    pub async fn post(
        &self,
        path: &str,
        params: &Params,
        body: &str,
        target: &Target,
    ) -> Result<ResponseBody> {
        self.request(Method::Post, path, params, Some(body), target)
            .await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<&str>,
        target: &Target,
    ) -> Result<ResponseBody> {
        let instance = self.registry.resolve(target).await?;
        let url = format!("{}/{}", instance.url, path.trim_start_matches('/'));

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| BridgeError::Transport("request limiter closed".to_string()))?;

        let mut last_error = None;
        for attempt in 0..=self.policy.max_retries {
            let request = HttpRequest {
                method,
                url: url.clone(),
                query: params.pairs(),
                body: body.map(str::to_string),
                timeout: None,
            };
            match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    return Ok(ResponseBody::decode(&response.body));
                }
                Ok(response) => {
                    return Err(BridgeError::HttpStatus {
                        status: response.status,
                        reason: response.reason,
                    });
                }
                Err(err) if err.is_retryable() => {
                    log::warn!(
                        "Request attempt {} to {} {url} failed: {err}",
                        attempt + 1,
                        method.as_str()
                    );
                    if attempt < self.policy.max_retries {
                        tokio::time::sleep(self.policy.backoff_for(attempt + 1)).await;
                    }
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| BridgeError::Transport("unknown error".to_string())))
    }
}
