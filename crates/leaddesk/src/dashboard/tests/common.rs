use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::config::{AdminCredentials, DashboardConfig};
use crate::dashboard::Dashboard;
use crate::store::{
    CollectionQuery, Document, DocumentId, DocumentStore, MemoryStore, NewDocument, StoreError,
};

pub(super) const USERNAME: &str = "admin";
pub(super) const PASSWORD: &str = "correct horse";

pub(super) fn config() -> DashboardConfig {
    DashboardConfig {
        freshness: Duration::from_secs(30),
        login_delay: Duration::ZERO,
        credentials: AdminCredentials::new(USERNAME, PASSWORD),
    }
}

/// Ids of the seeded job applications.
pub(super) struct SeededJobs {
    pub ada: DocumentId,
    pub linus: DocumentId,
}

/// One record of every kind plus a second, rejected job application.
pub(super) fn seed(store: &MemoryStore) -> SeededJobs {
    store
        .insert(
            "academy_applications",
            NewDocument::new()
                .set("name", "Grace Hopper")
                .set("email", "grace@navy.mil")
                .set("program", "Data Science")
                .set("status", "pending")
                .set("createdAt", "2025-05-02T10:00:00Z"),
        )
        .expect("seed course application");
    store
        .insert(
            "projects",
            NewDocument::new()
                .set("name", "Alan Turing")
                .set("company", "Bletchley")
                .set("projectType", "web-app")
                .set("status", "approved")
                .set("createdAt", "2025-05-03T10:00:00Z"),
        )
        .expect("seed project");
    store
        .insert(
            "contactMessages",
            NewDocument::new()
                .set("name", "Katherine Johnson")
                .set("subject", "Partnership")
                .server_timestamp("timestamp"),
        )
        .expect("seed message");
    let ada = store
        .insert(
            "applications",
            NewDocument::new()
                .set("name", "Ada")
                .set("email", "ada@x.com")
                .set("position", "Software Engineer")
                .set("coverLetter", "Hello")
                .set("status", "pending")
                .set("createdAt", "2025-05-04T10:00:00Z"),
        )
        .expect("seed job");
    let linus = store
        .insert(
            "applications",
            NewDocument::new()
                .set("name", "Linus")
                .set("email", "linus@kernel.org")
                .set("position", "Kernel Maintainer")
                .set("coverLetter", "Hi")
                .set("status", "rejected")
                .set("createdAt", "2025-05-01T10:00:00Z"),
        )
        .expect("seed job");

    SeededJobs { ada, linus }
}

pub(super) fn seeded_dashboard() -> (Arc<Dashboard<MemoryStore>>, Arc<MemoryStore>, SeededJobs) {
    let store = MemoryStore::new().with_query_log();
    let jobs = seed(&store);
    let store = Arc::new(store);
    let dashboard = Arc::new(Dashboard::new(Arc::clone(&store), &config()));
    (dashboard, store, jobs)
}

pub(super) async fn signed_in() -> (Arc<Dashboard<MemoryStore>>, Arc<MemoryStore>, SeededJobs) {
    let (dashboard, store, jobs) = seeded_dashboard();
    dashboard
        .login(USERNAME, PASSWORD)
        .await
        .expect("credentials accepted");
    (dashboard, store, jobs)
}

/// Store whose queries block while a matching key is held.
///
/// A key matches a query by collection name or by requested status.
pub(super) struct GatedStore {
    inner: MemoryStore,
    held: Mutex<Vec<String>>,
    opened: Condvar,
    waiting: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedStore {
    pub(super) fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            held: Mutex::new(Vec::new()),
            opened: Condvar::new(),
            waiting: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub(super) fn hold(&self, key: &str) {
        self.held.lock().expect("gate mutex").push(key.to_string());
    }

    pub(super) fn release(&self, key: &str) {
        self.held.lock().expect("gate mutex").retain(|held| held != key);
        self.opened.notify_all();
    }

    pub(super) fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub(super) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn blocks(held: &[String], query: &CollectionQuery) -> bool {
        held.iter()
            .any(|key| query.collection == *key || query.status.as_deref() == Some(key.as_str()))
    }
}

impl DocumentStore for GatedStore {
    fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        let mut held = self.held.lock().expect("gate mutex");
        if Self::blocks(&held, query) {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            while Self::blocks(&held, query) {
                held = self.opened.wait(held).expect("gate mutex");
            }
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
        drop(held);

        let result = self.inner.query(query);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn insert(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        self.inner.insert(collection, document)
    }

    fn update_status(
        &self,
        collection: &str,
        id: &DocumentId,
        status: &str,
    ) -> Result<(), StoreError> {
        self.inner.update_status(collection, id, status)
    }
}

/// Store that fails every query against one collection.
pub(super) struct BrokenCollection {
    pub inner: MemoryStore,
    pub collection: &'static str,
}

impl DocumentStore for BrokenCollection {
    fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        if query.collection == self.collection {
            return Err(StoreError::Unavailable("permission denied".to_string()));
        }
        self.inner.query(query)
    }

    fn insert(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        self.inner.insert(collection, document)
    }

    fn update_status(
        &self,
        collection: &str,
        id: &DocumentId,
        status: &str,
    ) -> Result<(), StoreError> {
        self.inner.update_status(collection, id, status)
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub(super) async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub(super) async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json body")
}
