//! In-memory entity store
//!
//! Backs tests and single-process embedding. Incomplete keys are assigned
//! monotonically increasing integer ids, mirroring what a real store does
//! positionally within a batch.

use bson::Document;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{EntityKey, EntityStore, StoreError};

/// Simple in-memory entity store
pub struct MemoryStore {
    entities: Arc<RwLock<HashMap<String, Document>>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// Fetch a stored entity by complete key
    pub async fn get(&self, key: &EntityKey) -> Option<Document> {
        let index = key.encoded()?;
        self.entities.read().await.get(&index).cloned()
    }

    /// Number of stored entities
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn put_many(
        &self,
        keys: Vec<EntityKey>,
        values: Vec<Document>,
    ) -> Result<Vec<EntityKey>, StoreError> {
        if keys.len() != values.len() {
            return Err(StoreError::InvalidBatch(format!(
                "{} keys against {} values",
                keys.len(),
                values.len()
            )));
        }

        let mut entities = self.entities.write().await;
        let mut completed = Vec::with_capacity(keys.len());

        for (key, value) in keys.into_iter().zip(values) {
            let key = if key.is_complete() {
                key
            } else {
                EntityKey::with_id(&key.kind, self.next_id.fetch_add(1, Ordering::SeqCst))
            };
            // is_complete above guarantees an encoding here
            if let Some(index) = key.encoded() {
                entities.insert(index, value);
            }
            completed.push(key);
        }

        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        let key = EntityKey::with_name("Post", "hello");

        let completed = store
            .put_many(vec![key.clone()], vec![doc! { "title": "Hello" }])
            .await
            .unwrap();

        assert_eq!(completed, vec![key.clone()]);
        let fetched = store.get(&key).await.unwrap();
        assert_eq!(fetched.get_str("title").unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_assigns_ids_in_batch_order() {
        let store = MemoryStore::new();
        let keys = vec![
            EntityKey::incomplete("Post"),
            EntityKey::with_id("Post", 99),
            EntityKey::incomplete("Post"),
        ];
        let values = vec![
            doc! { "n": 1 },
            doc! { "n": 2 },
            doc! { "n": 3 },
        ];

        let completed = store.put_many(keys, values).await.unwrap();

        assert_eq!(completed[0], EntityKey::with_id("Post", 1));
        assert_eq!(completed[1], EntityKey::with_id("Post", 99));
        assert_eq!(completed[2], EntityKey::with_id("Post", 2));
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_mismatched_batch_rejected() {
        let store = MemoryStore::new();
        let result = store
            .put_many(vec![EntityKey::with_id("Post", 1)], vec![])
            .await;
        assert!(matches!(result, Err(StoreError::InvalidBatch(_))));
    }

    #[tokio::test]
    async fn test_overwrite_same_key() {
        let store = MemoryStore::new();
        let key = EntityKey::with_id("Post", 1);

        store
            .put_many(vec![key.clone()], vec![doc! { "v": 1 }])
            .await
            .unwrap();
        store
            .put_many(vec![key.clone()], vec![doc! { "v": 2 }])
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&key).await.unwrap().get_i32("v").unwrap(), 2);
    }
}
