//! In-process store and identity provider

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{auto_id, DocumentStore, IdentityProvider, StoreError, StoreResult};
use crate::models::{Document, Fields};

type Collection = BTreeMap<String, Fields>;

/// Document store kept in memory; collections list in id order
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

/// Overlay `incoming` onto `target`, descending into non-empty maps
fn deep_merge(target: &mut Fields, incoming: Fields) {
    for (name, value) in incoming {
        let slot = target.entry(name).or_insert(Value::Null);
        match (slot, value) {
            (Value::Object(existing), Value::Object(inner)) if !inner.is_empty() => {
                deep_merge(existing, inner)
            }
            (slot, value) => *slot = value,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut id = auto_id();
        while docs.contains_key(&id) {
            id = auto_id();
        }
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        deep_merge(document, fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

/// Identity provider kept in memory, keyed by principal id
#[derive(Default)]
pub struct MemoryIdentity {
    principals: RwLock<HashMap<String, String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.principals.read().await.contains_key(id)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_principal(&self, email: &str, _password: &str) -> StoreResult<String> {
        let mut principals = self.principals.write().await;
        if principals.values().any(|existing| existing == email) {
            return Err(StoreError::Identity("EMAIL_EXISTS".to_string()));
        }

        let id = auto_id();
        principals.insert(id.clone(), email.to_string());
        Ok(id)
    }

    async fn delete_principal(&self, id: &str) -> StoreResult<()> {
        self.principals
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::Identity("USER_NOT_FOUND".to_string()))
    }
}
