//! Recursive flattening of an arbitrary JSON value into `(path, leaf-value)`
//! pairs fed to a [`SchemaStore`].

use crate::schema_store::SchemaStore;
use crate::value::JsonValue;

/// Walk `value`, recording each leaf at its flattened path into `store`.
///
/// `base_path` is the path already accumulated by the caller; pass `""` at
/// the root. Array traversal appends `[]` to the current path rather than
/// an index, so `{"friends":[{"name":"x"}]}` yields the single path
/// `friends[].name`.
pub async fn extract(store: &SchemaStore, base_path: &str, value: &JsonValue) {
    if base_path.is_empty() && value.is_null() {
        return;
    }

    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                let child_path = if base_path.is_empty() {
                    key.clone()
                } else {
                    format!("{base_path}.{key}")
                };
                if child.is_null() {
                    store.add_value(&child_path, JsonValue::Null).await;
                } else {
                    Box::pin(extract(store, &child_path, child)).await;
                }
            }
        }
        JsonValue::Array(items) => {
            if items.is_empty() {
                if !base_path.is_empty() && !base_path.contains(']') {
                    store.add_value(&format!("{base_path}[]"), JsonValue::Null).await;
                }
                return;
            }
            if items.first().is_some_and(JsonValue::is_object) {
                let array_path = format!("{base_path}[]");
                for item in items {
                    Box::pin(extract(store, &array_path, item)).await;
                }
            } else {
                if !base_path.is_empty() && !base_path.contains(']') {
                    let array_path = format!("{base_path}[]");
                    for item in items {
                        store.add_value(&array_path, item.clone()).await;
                    }
                }
            }
        }
        primitive if !base_path.is_empty() => {
            store.add_value(base_path, primitive.clone()).await;
        }
        _ => {}
    }
}
