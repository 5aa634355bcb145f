//! Scripted [`Transport`] for exercising discovery and routing without sockets.
//!
//! Responses are keyed by `(port, path)`. A route can carry queued one-shot responses, consumed
//! first, and a sticky response returned afterwards. Unscripted routes fail like a closed port.
//! An optional latency keeps each exchange open so concurrency limits become observable.

use crate::error::{BridgeError, Result};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

type RouteKey = (u16, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub port: u16,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<RouteKey, VecDeque<Result<HttpResponse>>>>,
    sticky: Mutex<HashMap<RouteKey, Result<HttpResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, port: u16, path: &str, response: Result<HttpResponse>) {
        self.sticky
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((port, path.to_string()), response);
    }

    pub fn enqueue(&self, port: u16, path: &str, response: Result<HttpResponse>) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((port, path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Every exchange sleeps for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
    }

    /// Highest number of exchanges that were open at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Drops every scripted response for the route.
    pub fn clear(&self, port: u16, path: &str) {
        let key = (port, path.to_string());
        self.sticky
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, port: u16, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.port == port && call.path == path)
            .count()
    }

    pub fn last_call(&self, port: u16, path: &str) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|call| call.port == port && call.path == path)
            .cloned()
    }

    fn next_response(&self, key: &RouteKey) -> Result<HttpResponse> {
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        if let Some(response) = queued {
            return response;
        }
        self.sticky
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(refused()))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|err| BridgeError::Transport(format!("invalid url: {err}")))?;
        let port = url.port_or_known_default().unwrap_or(80);
        let path = url.path().to_string();

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method: request.method,
                port,
                path: path.clone(),
                query: request.query,
                body: request.body,
            });

        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(open, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.next_response(&(port, path))
    }
}

pub fn refused() -> BridgeError {
    BridgeError::Transport("connection failed: connection refused".to_string())
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        reason: reason_for(status).to_string(),
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        reason: reason_for(status).to_string(),
        body: body.to_string(),
    }
}

/// `/status` payload of an instance with a binary loaded.
pub fn loaded_status(filename: &str) -> HttpResponse {
    json_response(200, json!({ "loaded": true, "filename": filename }))
}

fn reason_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}
