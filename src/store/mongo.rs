//! MongoDB-backed entity store
//!
//! Maps entity kinds to collections and entity ids to `_id`. Complete
//! keys upsert their document; incomplete keys insert and adopt the
//! generated ObjectId as their assigned name.

use bson::{doc, Bson, Document};
use mongodb::Client;
use tracing::info;

use super::{EntityId, EntityKey, EntityStore, StoreError};

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    /// Connect and verify the deployment is reachable
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    fn collection(&self, kind: &str) -> mongodb::Collection<Document> {
        self.client.database(&self.db_name).collection(kind)
    }

    async fn put_one(&self, key: EntityKey, value: Document) -> Result<EntityKey, StoreError> {
        match &key.id {
            Some(id) => {
                let filter = doc! { "_id": id_to_bson(id) };
                self.collection(&key.kind)
                    .replace_one(filter, value)
                    .upsert(true)
                    .await
                    .map_err(|e| StoreError::WriteFailed(format!("Replace failed: {}", e)))?;
                Ok(key)
            }
            None => {
                let result = self
                    .collection(&key.kind)
                    .insert_one(value)
                    .await
                    .map_err(|e| StoreError::WriteFailed(format!("Insert failed: {}", e)))?;

                let oid = result.inserted_id.as_object_id().ok_or_else(|| {
                    StoreError::WriteFailed("Failed to get inserted ID".into())
                })?;
                Ok(EntityKey {
                    kind: key.kind,
                    id: Some(EntityId::Name(oid.to_hex())),
                })
            }
        }
    }
}

fn id_to_bson(id: &EntityId) -> Bson {
    match id {
        EntityId::Int(v) => Bson::Int64(*v),
        EntityId::Name(s) => Bson::String(s.clone()),
    }
}

#[async_trait::async_trait]
impl EntityStore for MongoStore {
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

        let mut completed = Vec::with_capacity(keys.len());
        let mut errors: Vec<Option<StoreError>> = Vec::with_capacity(keys.len());
        let mut failed = false;

        for (key, value) in keys.into_iter().zip(values) {
            match self.put_one(key.clone(), value).await {
                Ok(assigned) => {
                    completed.push(assigned);
                    errors.push(None);
                }
                Err(e) => {
                    failed = true;
                    completed.push(key);
                    errors.push(Some(e));
                }
            }
        }

        if failed {
            Err(StoreError::Multi(errors))
        } else {
            Ok(completed)
        }
    }
}
