//! In-memory document store

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::ports::{Collection, Document, DocumentStore, WriteBatch, WriteOp};

type Collections = HashMap<Collection, BTreeMap<String, JsonValue>>;

/// Document store held entirely in process memory
///
/// Nothing survives a restart. Used by tests and when the configuration
/// asks for an in-memory database.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| Error::database("In-memory store lock poisoned"))
    }
}

/// Generate a document key
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn apply(collections: &mut Collections, op: WriteOp) {
    match op {
        WriteOp::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&id);
            }
        }
        WriteOp::Create { collection, data } => {
            collections
                .entry(collection)
                .or_default()
                .insert(generate_id(), data);
        }
        WriteOp::Set {
            collection,
            id,
            data,
        } => {
            collections.entry(collection).or_default().insert(id, data);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let collections = self.lock()?;
        Ok(collections
            .get(&collection)
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

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let mut collections = self.lock()?;
        apply(
            &mut collections,
            WriteOp::Delete {
                collection,
                id: id.to_string(),
            },
        );
        Ok(())
    }

    async fn create(&self, collection: Collection, data: JsonValue) -> Result<String> {
        let id = generate_id();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, data: JsonValue) -> Result<()> {
        let mut collections = self.lock()?;
        apply(
            &mut collections,
            WriteOp::Set {
                collection,
                id: id.to_string(),
                data,
            },
        );
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        // One lock for the whole batch, so readers never see half of it
        let mut collections = self.lock()?;
        for op in batch.into_ops() {
            apply(&mut collections, op);
        }
        Ok(())
    }

    async fn count(&self, collection: Collection) -> Result<usize> {
        let collections = self.lock()?;
        Ok(collections.get(&collection).map(BTreeMap::len).unwrap_or(0))
    }
}
