//! The [`Endpoint`] record and the [`Registry`] that keys endpoints by
//! `(method, normalized path)`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::redaction::RedactionList;
use crate::schema_store::{SchemaStore, SchemaStoreSnapshot};

/// Everything observed under one `(method, normalized path)` key.
#[derive(Debug)]
pub struct Endpoint {
    /// The HTTP method, uppercase.
    pub method: String,
    /// The normalized URL template.
    pub url: String,
    /// Observed request headers (already filtered to exclude the fixed
    /// transport-level set).
    pub request_headers: SchemaStore,
    /// Observed JSON request body fields.
    pub request_payload: SchemaStore,
    /// Observed query parameters.
    pub url_parameters: SchemaStore,
    /// Per-status-code response data.
    pub response_statuses: RwLock<IndexMap<u16, Arc<ResponseSlot>>>,
    redaction: Arc<RedactionList>,
    max_examples: usize,
}

/// The response-headers and response-body stores for one observed status
/// code on one endpoint.
#[derive(Debug)]
pub struct ResponseSlot {
    /// Observed response headers for this status.
    pub headers: SchemaStore,
    /// Observed JSON response body fields for this status.
    pub payload: SchemaStore,
}

impl Endpoint {
    fn new(method: String, url: String, redaction: Arc<RedactionList>, max_examples: usize) -> Self {
        Self {
            method,
            url,
            request_headers: SchemaStore::new(redaction.clone(), max_examples),
            request_payload: SchemaStore::new(redaction.clone(), max_examples),
            url_parameters: SchemaStore::new(redaction.clone(), max_examples),
            response_statuses: RwLock::new(IndexMap::new()),
            redaction,
            max_examples,
        }
    }

}

/// Process-wide mapping from `(method, normalized path)` to [`Endpoint`].
///
/// A single readers-writer lock guards insertion of new keys; once an
/// `Endpoint` handle is obtained, all further writes go through its own
/// per-store locks, matching the "Registry first, then SchemaStore" lock
/// ordering.
#[derive(Debug, Default)]
pub struct Registry {
    endpoints: RwLock<IndexMap<String, Arc<Endpoint>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the composite key used to index an endpoint.
    pub fn key(method: &str, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Get the endpoint for `(method, path)`, creating it if this is the
    /// first observed exchange for that key.
    pub async fn get_or_create(
        &self,
        method: &str,
        path: &str,
        redaction: &Arc<RedactionList>,
        max_examples: usize,
    ) -> Arc<Endpoint> {
        let key = Self::key(method, path);
        if let Some(endpoint) = self.endpoints.read().await.get(&key) {
            return endpoint.clone();
        }
        let mut endpoints = self.endpoints.write().await;
        endpoints
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Endpoint::new(
                    method.to_owned(),
                    path.to_owned(),
                    redaction.clone(),
                    max_examples,
                ))
            })
            .clone()
    }

    /// Snapshot every endpoint under a single point-in-time read, for
    /// persistence and for the raw `/api/analyzer` view.
    pub async fn snapshot(&self) -> IndexMap<String, EndpointSnapshot> {
        let endpoints = self.endpoints.read().await;
        let mut out = IndexMap::with_capacity(endpoints.len());
        for (key, endpoint) in endpoints.iter() {
            out.insert(key.clone(), endpoint.snapshot().await);
        }
        out
    }

    /// Replace the registry's contents wholesale from a loaded snapshot.
    pub async fn restore(
        &self,
        snapshot: IndexMap<String, EndpointSnapshot>,
        redaction: &Arc<RedactionList>,
        max_examples: usize,
    ) {
        let mut endpoints = self.endpoints.write().await;
        endpoints.clear();
        for (key, endpoint_snapshot) in snapshot {
            let endpoint = Arc::new(
                Endpoint::from_snapshot(endpoint_snapshot, redaction.clone(), max_examples).await,
            );
            endpoints.insert(key, endpoint);
        }
    }

    /// Iterate every registered endpoint, for the OpenAPI assembler.
    pub async fn endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints.read().await.values().cloned().collect()
    }
}

impl Endpoint {
    /// Get-or-create the response slot for `status`, returning an owned
    /// handle so the caller can release the `response_statuses` lock before
    /// writing into the slot's stores.
    pub async fn get_or_create_response_slot(&self, status: u16) -> Arc<ResponseSlot> {
        if let Some(slot) = self.response_statuses.read().await.get(&status) {
            return slot.clone();
        }
        let mut statuses = self.response_statuses.write().await;
        statuses
            .entry(status)
            .or_insert_with(|| {
                Arc::new(ResponseSlot {
                    headers: SchemaStore::new(self.redaction.clone(), self.max_examples),
                    payload: SchemaStore::new(self.redaction.clone(), self.max_examples),
                })
            })
            .clone()
    }

    async fn snapshot(&self) -> EndpointSnapshot {
        let mut response_statuses = IndexMap::new();
        for (status, slot) in self.response_statuses.read().await.iter() {
            response_statuses.insert(
                status.to_string(),
                ResponseSlotSnapshot {
                    headers: slot.headers.snapshot().await,
                    payload: slot.payload.snapshot().await,
                },
            );
        }
        EndpointSnapshot {
            method: self.method.clone(),
            url: self.url.clone(),
            request_headers: self.request_headers.snapshot().await,
            request_payload: self.request_payload.snapshot().await,
            url_parameters: self.url_parameters.snapshot().await,
            response_statuses,
        }
    }

    async fn from_snapshot(
        snapshot: EndpointSnapshot,
        redaction: Arc<RedactionList>,
        max_examples: usize,
    ) -> Self {
        let endpoint = Endpoint::new(snapshot.method, snapshot.url, redaction, max_examples);
        endpoint.request_headers.restore(snapshot.request_headers).await;
        endpoint.request_payload.restore(snapshot.request_payload).await;
        endpoint.url_parameters.restore(snapshot.url_parameters).await;
        let mut statuses = endpoint.response_statuses.write().await;
        for (status_str, slot_snapshot) in snapshot.response_statuses {
            let Ok(status) = status_str.parse::<u16>() else {
                continue;
            };
            let slot = ResponseSlot {
                headers: SchemaStore::new(endpoint.redaction.clone(), endpoint.max_examples),
                payload: SchemaStore::new(endpoint.redaction.clone(), endpoint.max_examples),
            };
            slot.headers.restore(slot_snapshot.headers).await;
            slot.payload.restore(slot_snapshot.payload).await;
            statuses.insert(status, Arc::new(slot));
        }
        drop(statuses);
        endpoint
    }
}

/// The serialized shape of one [`Endpoint`], matching the snapshot file
/// format documented in SPEC_FULL.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSnapshot {
    /// See [`Endpoint::method`].
    #[serde(rename = "Method")]
    pub method: String,
    /// See [`Endpoint::url`].
    #[serde(rename = "URL")]
    pub url: String,
    /// See [`Endpoint::request_headers`].
    #[serde(rename = "RequestHeaders")]
    pub request_headers: SchemaStoreSnapshot,
    /// See [`Endpoint::request_payload`].
    #[serde(rename = "RequestPayload")]
    pub request_payload: SchemaStoreSnapshot,
    /// See [`Endpoint::url_parameters`].
    #[serde(rename = "URLParameters")]
    pub url_parameters: SchemaStoreSnapshot,
    /// See [`Endpoint::response_statuses`].
    #[serde(rename = "ResponseStatuses")]
    pub response_statuses: IndexMap<String, ResponseSlotSnapshot>,
}

/// The serialized shape of one [`ResponseSlot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSlotSnapshot {
    /// See [`ResponseSlot::headers`].
    #[serde(rename = "Headers")]
    pub headers: SchemaStoreSnapshot,
    /// See [`ResponseSlot::payload`].
    #[serde(rename = "Payload")]
    pub payload: SchemaStoreSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent_for_same_key() {
        let registry = Registry::new();
        let redaction = Arc::new(RedactionList::default());
        let a = registry.get_or_create("GET", "/x", &redaction, 10).await;
        let b = registry.get_or_create("GET", "/x", &redaction, 10).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn different_methods_on_same_path_are_distinct_endpoints() {
        let registry = Registry::new();
        let redaction = Arc::new(RedactionList::default());
        registry.get_or_create("GET", "/x", &redaction, 10).await;
        registry.get_or_create("POST", "/x", &redaction, 10).await;
        assert_eq!(registry.endpoints().await.len(), 2);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_restore() {
        let registry = Registry::new();
        let redaction = Arc::new(RedactionList::default());
        let endpoint = registry.get_or_create("GET", "/x", &redaction, 10).await;
        endpoint
            .request_payload
            .add_value("name", crate::value::JsonValue::String("n".into()))
            .await;

        let snapshot = registry.snapshot().await;
        let restored = Registry::new();
        restored.restore(snapshot, &redaction, 10).await;

        let endpoints = restored.endpoints().await;
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, "GET");
    }

    #[tokio::test]
    async fn response_slot_is_shared_across_calls_for_same_status() {
        let registry = Registry::new();
        let redaction = Arc::new(RedactionList::default());
        let endpoint = registry.get_or_create("GET", "/x", &redaction, 10).await;
        let a = endpoint.get_or_create_response_slot(200).await;
        a.payload
            .add_value("id", crate::value::JsonValue::Int(1))
            .await;
        let b = endpoint.get_or_create_response_slot(200).await;
        assert!(!b.payload.is_empty().await);
    }
}
