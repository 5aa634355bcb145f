//! Short-lived memoization of list reads.
//!
//! Entries expire lazily: validity is checked when a key is read, and an expired entry is only
//! removed by that read or when an insert finds the store at capacity. The store is bounded;
//! once full, expired entries are pruned and then the oldest insertions are evicted.

use crate::params::{Params, Target};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    params: Params,
    target: Target,
}

impl CacheKey {
    pub fn new(name: &str, params: &Params, target: &Target) -> Self {
        Self {
            name: name.to_string(),
            params: params.clone(),
            target: target.clone(),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

struct CacheStore<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    order: VecDeque<CacheKey>,
}

impl<V> CacheStore<V> {
    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    fn prune_expired(&mut self, now: Instant, ttl: Duration) {
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) <= ttl);
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
    }
}

pub struct TtlCache<V> {
    ttl: Duration,
    capacity: usize,
    store: Mutex<CacheStore<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            store: Mutex::new(CacheStore {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = now.duration_since(store.entries.get(key)?.inserted_at) > self.ttl;
        if expired {
            store.remove(key);
            return None;
        }
        store.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        let now = Instant::now();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if store.entries.contains_key(&key) {
            store.order.retain(|k| k != &key);
        } else if store.entries.len() >= self.capacity {
            store.prune_expired(now, self.ttl);
            while store.entries.len() >= self.capacity {
                let Some(oldest) = store.order.pop_front() else {
                    break;
                };
                store.entries.remove(&oldest);
            }
        }
        store.order.push_back(key.clone());
        store.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(key)
    }
}
