use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use super::timestamp::{resolve_timestamp, timestamp_object};
use super::{
    CollectionQuery, Document, DocumentId, DocumentStore, FieldValue, NewDocument, StoreError,
};

/// In-process document store with server-assigned ids and ordered queries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    sequence: AtomicU64,
    log_queries: bool,
    query_log: Mutex<Vec<CollectionQuery>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every query served, for assertions in tests. Off by default.
    pub fn with_query_log(mut self) -> Self {
        self.log_queries = true;
        self
    }

    /// Build a store from `{ "<collection>": [ { ...fields } ] }`.
    ///
    /// A string `id` field is kept as the document id; every other document
    /// receives a generated one. Seeded ids must be unique, and generated ids
    /// continue past the highest seeded `doc-NNNNNN`.
    pub fn from_seed_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        let seed: Map<String, Value> = serde_json::from_reader(reader)?;
        let store = Self::new();

        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for (collection, documents) in seed {
            let Value::Array(documents) = documents else {
                return Err(SeedError::Shape(format!(
                    "collection '{collection}' must be an array of objects"
                )));
            };

            for document in documents {
                let Value::Object(mut fields) = document else {
                    return Err(SeedError::Shape(format!(
                        "collection '{collection}' contains a non-object document"
                    )));
                };
                let id = match fields.remove("id") {
                    Some(Value::String(id)) if !id.trim().is_empty() => {
                        if !seen.insert(id.clone()) {
                            return Err(SeedError::DuplicateId(id));
                        }
                        if let Some(number) = generated_number(&id) {
                            store.sequence.fetch_max(number, Ordering::Relaxed);
                        }
                        Some(DocumentId(id))
                    }
                    _ => None,
                };
                pending.push((collection.clone(), id, fields));
            }
        }

        {
            let mut collections = store.lock_collections();
            for (collection, id, fields) in pending {
                let id = id.unwrap_or_else(|| store.next_id());
                collections
                    .entry(collection)
                    .or_default()
                    .push(Document { id, fields });
            }
        }

        Ok(store)
    }

    pub fn from_seed_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let file = std::fs::File::open(path)?;
        Self::from_seed_reader(file)
    }

    /// Queries served so far, oldest first. Empty unless built `with_query_log`.
    pub fn query_log(&self) -> Vec<CollectionQuery> {
        self.query_log
            .lock()
            .expect("query log mutex poisoned")
            .clone()
    }

    pub fn document(&self, collection: &str, id: &DocumentId) -> Option<Document> {
        self.lock_collections()
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| &doc.id == id))
            .cloned()
    }

    fn next_id(&self) -> DocumentId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        DocumentId(format!("doc-{id:06}"))
    }

    fn lock_collections(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections.lock().expect("store mutex poisoned")
    }
}

impl DocumentStore for MemoryStore {
    fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        if self.log_queries {
            self.query_log
                .lock()
                .expect("query log mutex poisoned")
                .push(query.clone());
        }

        let guard = self.lock_collections();
        let mut matches: Vec<Document> = guard
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| match &query.status {
                        Some(status) => {
                            doc.fields.get("status").and_then(Value::as_str) == Some(status)
                        }
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(guard);

        matches.sort_by(|a, b| {
            let left = a.fields.get(&query.order_by).and_then(resolve_timestamp);
            let right = b.fields.get(&query.order_by).and_then(resolve_timestamp);
            match (left, right) {
                (Some(left), Some(right)) => right.cmp(&left),
                (Some(_), None) => CmpOrdering::Less,
                (None, Some(_)) => CmpOrdering::Greater,
                (None, None) => CmpOrdering::Equal,
            }
            .then_with(|| a.id.cmp(&b.id))
        });

        debug!(
            collection = %query.collection,
            status = ?query.status,
            matched = matches.len(),
            "memory store query served"
        );
        Ok(matches)
    }

    fn insert(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        if collection.trim().is_empty() {
            return Err(StoreError::Rejected("collection name is empty".to_string()));
        }

        let committed_at = Utc::now();
        let mut fields = Map::new();
        for (key, value) in document.fields() {
            let value = match value {
                FieldValue::Value(value) => value.clone(),
                FieldValue::ServerTimestamp => timestamp_object(committed_at),
            };
            fields.insert(key.clone(), value);
        }

        let id = self.next_id();
        self.lock_collections()
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    fn update_status(
        &self,
        collection: &str,
        id: &DocumentId,
        status: &str,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock_collections();
        let document = guard
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| &doc.id == id))
            .ok_or(StoreError::NotFound)?;

        document
            .fields
            .insert("status".to_string(), Value::from(status));
        document
            .fields
            .insert("updatedAt".to_string(), Value::from(Utc::now().to_rfc3339()));
        Ok(())
    }
}

fn generated_number(id: &str) -> Option<u64> {
    let digits = id.strip_prefix("doc-")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Failure loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected seed layout: {0}")]
    Shape(String),
    #[error("document id '{0}' appears more than once in the seed")]
    DuplicateId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn seeded() -> MemoryStore {
        let seed = json!({
            "projects": [
                { "id": "p-old", "name": "Old", "status": "pending", "createdAt": "2025-01-01T00:00:00Z" },
                { "id": "p-new", "name": "New", "status": "approved", "createdAt": "2025-03-01T00:00:00Z" },
                { "id": "p-mid", "name": "Mid", "status": "pending", "createdAt": "2025-02-01T00:00:00Z" },
                { "id": "p-none", "name": "Undated", "status": "pending" }
            ]
        });
        MemoryStore::from_seed_reader(Cursor::new(seed.to_string()))
            .expect("seed loads")
            .with_query_log()
    }

    fn ids(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|doc| doc.id.as_str()).collect()
    }

    #[test]
    fn orders_by_timestamp_descending_with_undated_last() {
        let store = seeded();
        let docs = store
            .query(&CollectionQuery::all("projects", "createdAt"))
            .expect("query succeeds");
        assert_eq!(ids(&docs), vec!["p-new", "p-mid", "p-old", "p-none"]);
    }

    #[test]
    fn applies_status_equality_before_ordering() {
        let store = seeded();
        let docs = store
            .query(&CollectionQuery::all("projects", "createdAt").with_status("pending"))
            .expect("query succeeds");
        assert_eq!(ids(&docs), vec!["p-mid", "p-old", "p-none"]);
        assert_eq!(store.query_log().len(), 1);
    }

    #[test]
    fn unknown_collections_are_empty() {
        let store = MemoryStore::new();
        let docs = store
            .query(&CollectionQuery::all("nothing", "createdAt"))
            .expect("query succeeds");
        assert!(docs.is_empty());
    }

    #[test]
    fn insert_assigns_ids_and_resolves_server_timestamps() {
        let store = MemoryStore::new();
        let first = store
            .insert(
                "contactMessages",
                NewDocument::new()
                    .set("name", "Ada")
                    .server_timestamp("timestamp"),
            )
            .expect("insert succeeds");
        let second = store
            .insert("contactMessages", NewDocument::new().set("name", "Grace"))
            .expect("insert succeeds");
        assert_ne!(first, second);

        let stored = store
            .document("contactMessages", &first)
            .expect("document stored");
        let stamp = stored.fields.get("timestamp").expect("timestamp set");
        assert!(stamp.is_object());
        assert!(resolve_timestamp(stamp).is_some());
    }

    #[test]
    fn update_status_reports_missing_documents() {
        let store = seeded();
        store
            .update_status("projects", &DocumentId("p-old".to_string()), "approved")
            .expect("update succeeds");
        let updated = store
            .document("projects", &DocumentId("p-old".to_string()))
            .expect("present");
        assert_eq!(updated.fields.get("status"), Some(&json!("approved")));

        let missing = store.update_status("projects", &DocumentId("nope".to_string()), "approved");
        assert_eq!(missing, Err(StoreError::NotFound));
    }

    #[test]
    fn inserts_after_seeding_never_reuse_a_seeded_id() {
        let seed = json!({
            "applications": [
                { "id": "doc-000001", "name": "Ada" },
                { "name": "Grace" },
                { "id": "doc-000003", "name": "Linus" }
            ]
        });
        let store = MemoryStore::from_seed_reader(Cursor::new(seed.to_string())).expect("seed loads");
        let inserted = store
            .insert("applications", NewDocument::new().set("name", "Alan"))
            .expect("insert succeeds");

        let docs = store
            .query(&CollectionQuery::all("applications", "createdAt"))
            .expect("query succeeds");
        let mut all = ids(&docs);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 4);
        assert_eq!(inserted.as_str(), "doc-000005");
    }

    #[test]
    fn seed_rejects_duplicate_ids() {
        let seed = json!({
            "projects": [{ "id": "p-1", "name": "One" }],
            "applications": [{ "id": "p-1", "name": "Two" }]
        });
        let result = MemoryStore::from_seed_reader(Cursor::new(seed.to_string()));
        assert!(matches!(result, Err(SeedError::DuplicateId(id)) if id == "p-1"));
    }

    #[test]
    fn queries_are_only_logged_when_enabled() {
        let store = MemoryStore::new();
        store
            .query(&CollectionQuery::all("projects", "createdAt"))
            .expect("query succeeds");
        assert!(store.query_log().is_empty());
    }

    #[test]
    fn seed_rejects_non_array_collections() {
        let result = MemoryStore::from_seed_reader(Cursor::new(r#"{"projects": {"a": 1}}"#));
        assert!(matches!(result, Err(SeedError::Shape(_))));
    }
}
