//! The path-keyed, example-bounded store that backs every category of
//! observed data on an endpoint (request headers, URL parameters, request
//! body, response headers, response body).
//!
//! Grounded on the teacher's `Arc<RwLock<Collectors>>` sharing pattern: one
//! lock guards both parallel maps, since the invariant that `examples` and
//! `optional` have identical key sets only holds if they are always
//! mutated together.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::redaction::RedactionList;
use crate::value::JsonValue;

const DEFAULT_MAX_EXAMPLES: usize = 10;

#[derive(Debug, Default)]
struct Inner {
    examples: IndexMap<String, Vec<JsonValue>>,
    optional: IndexMap<String, bool>,
}

/// A concurrency-safe bag of `(path -> distinct examples, path -> optional)`
/// for one category of data on one endpoint.
#[derive(Debug)]
pub struct SchemaStore {
    inner: RwLock<Inner>,
    redaction: Arc<RedactionList>,
    max_examples: usize,
}

impl SchemaStore {
    /// Create an empty store.
    ///
    /// `redaction` is a read-only handle consulted on every [`Self::add_value`]
    /// call; it is cloned rather than held via a back-reference to any owning
    /// analyzer, so a store never needs to know who created it.
    pub fn new(redaction: Arc<RedactionList>, max_examples: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            redaction,
            max_examples: max_examples.max(1),
        }
    }

    /// Record an observed value at `path`.
    ///
    /// Redaction is applied before the distinctness check, so every
    /// redacted occurrence of a field collapses into a single example. New
    /// paths start out marked optional; the store never flips a path back
    /// to required automatically (see the open question in SPEC_FULL.md).
    pub async fn add_value(&self, path: &str, value: JsonValue) {
        let field_name = RedactionList::final_segment(path);
        let value = self.redaction.apply(field_name, value);

        let mut inner = self.inner.write().await;
        let examples = inner.examples.entry(path.to_owned()).or_default();
        if examples.iter().any(|existing| existing == &value) {
            return;
        }
        if examples.len() < self.max_examples {
            examples.push(value);
        }
        inner.optional.entry(path.to_owned()).or_insert(true);
    }

    /// Explicitly set whether `path` is optional. Used by URL-parameter
    /// ingestion, which always marks observed parameters as optional since
    /// their absence on other requests cannot be distinguished from "not
    /// yet observed".
    pub async fn set_optional(&self, path: &str, optional: bool) {
        let mut inner = self.inner.write().await;
        inner.optional.insert(path.to_owned(), optional);
    }

    /// `true` if this store has no recorded paths.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.examples.is_empty()
    }

    /// Take a consistent, owned snapshot of both maps under a single read
    /// lock acquisition, for the (purely computational) schema synthesizer
    /// and for snapshot persistence.
    pub async fn snapshot(&self) -> SchemaStoreSnapshot {
        let inner = self.inner.read().await;
        SchemaStoreSnapshot {
            examples: inner.examples.clone(),
            optional: inner.optional.clone(),
        }
    }

    /// Replace the store's contents wholesale, used when loading a
    /// persisted snapshot at startup.
    pub async fn restore(&self, snapshot: SchemaStoreSnapshot) {
        let mut inner = self.inner.write().await;
        inner.examples = snapshot.examples;
        inner.optional = snapshot.optional;
    }
}

/// A point-in-time, lock-free copy of a [`SchemaStore`]'s contents.
///
/// This is also the shape persisted to the snapshot file and loaded back
/// from it (see [`crate::persist`]).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SchemaStoreSnapshot {
    /// Distinct examples observed at each path.
    #[serde(rename = "Examples")]
    pub examples: IndexMap<String, Vec<JsonValue>>,
    /// Whether each path has ever been seen as required.
    #[serde(rename = "Optional")]
    pub optional: IndexMap<String, bool>,
}

impl SchemaStoreSnapshot {
    /// `true` if no paths were recorded.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SchemaStore {
        SchemaStore::new(Arc::new(RedactionList::default()), DEFAULT_MAX_EXAMPLES)
    }

    #[tokio::test]
    async fn distinct_values_are_deduplicated() {
        let store = store();
        store.add_value("k", JsonValue::String("a".into())).await;
        store.add_value("k", JsonValue::String("a".into())).await;
        let snap = store.snapshot().await;
        assert_eq!(snap.examples.get("k").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn examples_are_capped() {
        let store = SchemaStore::new(Arc::new(RedactionList::default()), 2);
        for v in ["a", "a", "b", "c"] {
            store.add_value("k", JsonValue::String(v.into())).await;
        }
        let snap = store.snapshot().await;
        let examples = snap.examples.get("k").unwrap();
        assert_eq!(
            examples,
            &vec![JsonValue::String("a".into()), JsonValue::String("b".into())]
        );
    }

    #[tokio::test]
    async fn new_path_defaults_to_optional() {
        let store = store();
        store.add_value("k", JsonValue::Bool(true)).await;
        let snap = store.snapshot().await;
        assert_eq!(snap.optional.get("k"), Some(&true));
    }

    #[tokio::test]
    async fn redacted_field_collapses_to_single_placeholder_example() {
        let redaction = Arc::new(RedactionList::new(["password"]));
        let store = SchemaStore::new(redaction, DEFAULT_MAX_EXAMPLES);
        store
            .add_value("password", JsonValue::String("p1".into()))
            .await;
        store
            .add_value("password", JsonValue::String("p2".into()))
            .await;
        let snap = store.snapshot().await;
        assert_eq!(snap.examples.get("password").unwrap().len(), 1);
        assert_eq!(snap.examples.get("password").unwrap()[0], JsonValue::redacted());
    }

    #[tokio::test]
    async fn examples_and_optional_key_sets_stay_in_sync() {
        let store = store();
        store.add_value("a", JsonValue::Int(1)).await;
        store.add_value("b", JsonValue::Int(2)).await;
        let snap = store.snapshot().await;
        let mut example_keys: Vec<_> = snap.examples.keys().collect();
        let mut optional_keys: Vec<_> = snap.optional.keys().collect();
        example_keys.sort();
        optional_keys.sort();
        assert_eq!(example_keys, optional_keys);
    }
}
