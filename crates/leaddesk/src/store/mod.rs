//! Seam to the hosted document store.
//!
//! The dashboard only needs three capabilities: an equality-then-sort query,
//! insert-only document creation for the public forms, and a single-field
//! status update. `MemoryStore` is the bundled implementation.

mod memory;
pub mod timestamp;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use memory::{MemoryStore, SeedError};
pub use timestamp::resolve_timestamp;

/// Identifier assigned by the store; never generated by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document: its id plus the untyped field map as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

/// `collection` filtered by `status == S` (when set), ordered by `order_by` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionQuery {
    pub collection: String,
    pub order_by: String,
    pub status: Option<String>,
}

impl CollectionQuery {
    pub fn all(collection: impl Into<String>, order_by: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order_by: order_by.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Field value accepted on insert.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// Resolved by the store to its commit instant.
    ServerTimestamp,
}

/// Fields for a document that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDocument {
    fields: Vec<(String, FieldValue)>,
}

impl NewDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .push((key.into(), FieldValue::Value(value.into())));
        self
    }

    pub fn server_timestamp(mut self, key: impl Into<String>) -> Self {
        self.fields.push((key.into(), FieldValue::ServerTimestamp));
        self
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }
}

/// Storage abstraction so the dashboard and intake layers can run against any backend.
pub trait DocumentStore: Send + Sync {
    fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError>;
    fn insert(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError>;
    fn update_status(
        &self,
        collection: &str,
        id: &DocumentId,
        status: &str,
    ) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
