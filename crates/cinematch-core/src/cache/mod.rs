//! Query cache: deduplication, loading/error states, and invalidation
//!
//! Read results are keyed by [`QueryKey`] and held as type-erased JSON. The
//! cache exposes last-known-good data while a refetch for the same key is in
//! flight, and guarantees that the most recently initiated request's result
//! is the one that lands: each issued fetch gets a per-key ticket, and a
//! completion with a superseded ticket is discarded. Nothing is cancelled at
//! the wire; supersession is resolved here.

pub mod key;

pub use key::{ParamValue, QueryKey};

use crate::error::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tracing::debug;


/// Lifecycle state of one cached query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// A fetch is in flight (any previous data remains visible)
    Pending,
    /// The last completed fetch succeeded
    Success,
    /// The last completed fetch failed (any previous data remains visible)
    Error,
}

/// Consumer-visible snapshot of one cached query
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub status: QueryStatus,
    /// Last successfully fetched payload, kept through pending refetches and
    /// errors as last-known-good data
    pub data: Option<Value>,
    /// Message from the last failed fetch, cleared when a fetch is issued
    pub error: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Default for QueryEntry {
    fn default() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            last_fetched_at: None,
        }
    }
}

#[derive(Default)]
struct EntryState {
    entry: QueryEntry,
    /// Ticket of the most recently issued fetch for this key
    latest_ticket: u64,
    invalidated: bool,
}

/// Owner of all cached query results. Consumers read snapshots; mutation
/// happens only through the operations here.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, EntryState>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly issued fetch for `key`.
    ///
    /// Marks the entry pending while keeping last-known-good data visible,
    /// and returns the ticket that must accompany the completion.
    pub fn begin(&self, key: &QueryKey) -> u64 {
        let mut entries = self.entries.lock();
        let state = entries.entry(key.clone()).or_default();
        state.latest_ticket += 1;
        state.invalidated = false;
        state.entry.status = QueryStatus::Pending;
        state.entry.error = None;
        state.latest_ticket
    }

    /// Apply a completed fetch.
    ///
    /// Returns `false` (changing nothing) when a newer fetch for the same key
    /// was issued after this one; the stale result is discarded.
    pub fn complete(&self, key: &QueryKey, ticket: u64, result: Result<Value, String>) -> bool {
        let mut entries = self.entries.lock();
        let Some(state) = entries.get_mut(key) else {
            return false;
        };
        if ticket != state.latest_ticket {
            debug!(query = key.name(), "discarding superseded fetch result");
            return false;
        }

        match result {
            Ok(data) => {
                state.entry = QueryEntry {
                    status: QueryStatus::Success,
                    data: Some(data),
                    error: None,
                    last_fetched_at: Some(Utc::now()),
                };
            }
            Err(message) => {
                state.entry.status = QueryStatus::Error;
                state.entry.error = Some(message);
                state.entry.last_fetched_at = Some(Utc::now());
            }
        }
        true
    }

    /// Mark a key so the next [`QueryCache::query`] refetches it. The old
    /// value stays visible until the refetch lands.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(state) = self.entries.lock().get_mut(key) {
            state.invalidated = true;
        }
    }

    /// Read-only snapshot of one entry
    pub fn get(&self, key: &QueryKey) -> Option<QueryEntry> {
        self.entries.lock().get(key).map(|state| state.entry.clone())
    }

    /// Fetch-through front door.
    ///
    /// - `enabled == false`: nothing is issued and nothing cached; returns
    ///   `Ok(None)`. Used while a required parameter (e.g. the authenticated
    ///   user id) is not yet known.
    /// - A fresh successful entry short-circuits without refetching.
    /// - Otherwise the fetch runs under a ticket; a superseded completion is
    ///   discarded at the cache but still returned to its own caller.
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        enabled: bool,
        fetch: F,
    ) -> ClientResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if !enabled {
            return Ok(None);
        }

        if let Some(data) = self.fresh(&key) {
            let value =
                serde_json::from_value(data).map_err(|e| ClientError::decode(e.to_string()))?;
            return Ok(Some(value));
        }

        let ticket = self.begin(&key);
        match fetch().await {
            Ok(value) => {
                let data =
                    serde_json::to_value(&value).map_err(|e| ClientError::decode(e.to_string()))?;
                self.complete(&key, ticket, Ok(data));
                Ok(Some(value))
            }
            Err(err) => {
                self.complete(&key, ticket, Err(err.to_string()));
                Err(err)
            }
        }
    }

    /// Data for a key that needs no refetch: last fetch succeeded and the
    /// entry has not been invalidated
    fn fresh(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.lock();
        let state = entries.get(key)?;
        if state.invalidated || state.entry.status != QueryStatus::Success {
            return None;
        }
        state.entry.data.clone()
    }
}
