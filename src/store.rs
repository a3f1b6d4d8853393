//! Document store
//!
//! In-process document store exposing the per-collection CRUD and
//! field-filter primitives the handlers need: get/set/merge/update/delete,
//! id-assigning insert, equality queries, and an ordered listing. Documents
//! are JSON objects keyed by collection name + document id. The store itself
//! provides no transactions or cross-document ordering; callers that write
//! two documents get two independent writes.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("document {collection}/{id} is not a JSON object")]
    NotAnObject { collection: String, id: String },
}

/// In-memory document store
///
/// Collections are created implicitly on first write. Document ids within a
/// collection are unique; `set` overwrites, `merge` upserts field-wise.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a document, or `None` if the collection or id is absent
    pub async fn get(&self, collection: &str, id: &str) -> Option<Value> {
        let collections = self.collections.read().await;
        collections.get(collection).and_then(|c| c.get(id)).cloned()
    }

    /// Write a document, replacing any existing one
    pub async fn set(&self, collection: &str, id: &str, doc: Value) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    /// Merge fields into a document, creating it if absent
    pub async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        merge_into(doc, fields, collection, id)
    }

    /// Merge fields into an existing document; fails if it does not exist
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_into(doc, fields, collection, id)
    }

    /// Delete a document; deleting an absent document is a no-op
    pub async fn delete(&self, collection: &str, id: &str) {
        let mut collections = self.collections.write().await;
        if let Some(c) = collections.get_mut(collection) {
            c.remove(id);
        }
    }

    /// Insert a document under a freshly assigned id, returning the id
    pub async fn add(&self, collection: &str, doc: Value) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.set(collection, &id, doc).await;
        id
    }

    /// All documents whose `field` equals `value`, as (id, doc) pairs
    pub async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Vec<(String, Value)> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Vec::new();
        };
        docs.iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect()
    }

    /// All documents in a collection, ascending by the given field
    ///
    /// Documents missing the field sort first. Values are compared as JSON
    /// strings, which is sufficient for RFC 3339 timestamps.
    pub async fn list_ordered(&self, collection: &str, order_field: &str) -> Vec<(String, Value)> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Vec::new();
        };
        let mut result: Vec<(String, Value)> =
            docs.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect();
        result.sort_by(|(a_id, a), (b_id, b)| {
            let a_key = a.get(order_field).and_then(Value::as_str).unwrap_or("");
            let b_key = b.get(order_field).and_then(Value::as_str).unwrap_or("");
            a_key.cmp(b_key).then_with(|| a_id.cmp(b_id))
        });
        result
    }
}

fn merge_into(
    doc: &mut Value,
    fields: Map<String, Value>,
    collection: &str,
    id: &str,
) -> Result<(), StoreError> {
    let obj = doc.as_object_mut().ok_or_else(|| StoreError::NotAnObject {
        collection: collection.to_string(),
        id: id.to_string(),
    })?;
    for (key, value) in fields {
        obj.insert(key, value);
    }
    Ok(())
}
