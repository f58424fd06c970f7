//! Document store port - keyed JSON collections with batch writes

use std::fmt;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// The logical collections the workflow reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    PublicTokens,
    AccessTokens,
    Transactions,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::PublicTokens,
        Collection::AccessTokens,
        Collection::Transactions,
    ];

    /// Name used in storage
    pub fn name(&self) -> &'static str {
        match self {
            Collection::PublicTokens => "publicTokens",
            Collection::AccessTokens => "accessTokens",
            Collection::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document and its key
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: JsonValue,
}

/// A single write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Delete {
        collection: Collection,
        id: String,
    },
    /// Insert under a store-generated key
    Create {
        collection: Collection,
        data: JsonValue,
    },
    /// Insert or overwrite under an explicit key
    Set {
        collection: Collection,
        id: String,
        data: JsonValue,
    },
}

/// Ordered list of writes committed all-or-nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.into(),
        });
        self
    }

    pub fn create(&mut self, collection: Collection, data: JsonValue) -> &mut Self {
        self.ops.push(WriteOp::Create { collection, data });
        self
    }

    pub fn set(&mut self, collection: Collection, id: impl Into<String>, data: JsonValue) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection,
            id: id.into(),
            data,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Document store abstraction
///
/// Every collection is an independent keyed set of JSON documents.
/// Implementations (adapters) decide how keys are generated and how a
/// batch is made atomic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get every document in a collection, ordered by key
    async fn get_all(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Delete a document; deleting a missing key is not an error
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    /// Insert a document under a generated key and return the key
    async fn create(&self, collection: Collection, data: JsonValue) -> Result<String>;

    /// Insert or overwrite a document under an explicit key
    async fn set(&self, collection: Collection, id: &str, data: JsonValue) -> Result<()>;

    /// Apply all writes in the batch, or none of them
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Count documents in a collection
    async fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.get_all(collection).await?.len())
    }
}
