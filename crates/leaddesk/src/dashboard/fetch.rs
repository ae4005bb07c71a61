//! Cached, generation-checked record queries.
//!
//! Each record kind keeps one cache entry per status filter plus the list that is
//! currently published to its section. Every load bumps the kind's generation;
//! a response only publishes if its generation is still the latest, so a slow
//! answer to a superseded filter can never overwrite a newer one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::view::StatusFilter;
use crate::records::{
    decode_all, ContactMessage, CourseApplication, JobApplication, LifecycleStatus,
    ProjectRequest, Record, RecordKind,
};
use crate::store::{DocumentId, DocumentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Serve a fresh cache entry when one exists.
    PreferCache,
    /// Always query the store.
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Cached { records: usize },
    Fetched { records: usize },
    /// A newer request for the same kind was issued before this one resolved.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("query task did not complete: {0}")]
    Interrupted(String),
}

struct CacheEntry<R> {
    records: Arc<Vec<R>>,
    /// Monotonic instant for the freshness check.
    fetched_at: Instant,
    /// Wall-clock time reported to the section when this entry is published.
    fetched_on: DateTime<Utc>,
}

struct KindState<R> {
    entries: HashMap<StatusFilter, CacheEntry<R>>,
    generation: u64,
    /// Bumped when the cache is cleared; in-flight results from an older epoch are dropped.
    epoch: u64,
    published: Arc<Vec<R>>,
    published_filter: Option<StatusFilter>,
    published_at: Option<DateTime<Utc>>,
    loading: bool,
    error: Option<String>,
}

impl<R> Default for KindState<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            epoch: 0,
            published: Arc::new(Vec::new()),
            published_filter: None,
            published_at: None,
            loading: false,
            error: None,
        }
    }
}

pub struct KindCache<R> {
    state: Mutex<KindState<R>>,
}

impl<R> Default for KindCache<R> {
    fn default() -> Self {
        Self {
            state: Mutex::new(KindState::default()),
        }
    }
}

impl<R> KindCache<R> {
    fn lock(&self) -> MutexGuard<'_, KindState<R>> {
        self.state.lock().expect("record cache mutex poisoned")
    }
}

/// One cache per record kind.
#[derive(Default)]
pub struct RecordCaches {
    courses: KindCache<CourseApplication>,
    projects: KindCache<ProjectRequest>,
    messages: KindCache<ContactMessage>,
    jobs: KindCache<JobApplication>,
}

/// Records that have a cache slot in [`RecordCaches`].
pub trait Cached: Record {
    fn slot(caches: &RecordCaches) -> &KindCache<Self>;
}

impl Cached for CourseApplication {
    fn slot(caches: &RecordCaches) -> &KindCache<Self> {
        &caches.courses
    }
}

impl Cached for ProjectRequest {
    fn slot(caches: &RecordCaches) -> &KindCache<Self> {
        &caches.projects
    }
}

impl Cached for ContactMessage {
    fn slot(caches: &RecordCaches) -> &KindCache<Self> {
        &caches.messages
    }
}

impl Cached for JobApplication {
    fn slot(caches: &RecordCaches) -> &KindCache<Self> {
        &caches.jobs
    }
}

/// What a section currently shows for one record kind.
#[derive(Debug, Clone)]
pub struct SectionSnapshot<R> {
    pub records: Arc<Vec<R>>,
    pub filter: Option<StatusFilter>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct FetchLayer<S> {
    store: Arc<S>,
    freshness: Duration,
    caches: RecordCaches,
}

impl<S> FetchLayer<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, freshness: Duration) -> Self {
        Self {
            store,
            freshness,
            caches: RecordCaches::default(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load `R` for `filter` and publish it to the section if still current.
    ///
    /// Failures are recorded on the section (which keeps its previous records)
    /// and returned to the caller; nothing is retried.
    pub async fn load<R: Cached>(
        &self,
        filter: &StatusFilter,
        mode: FetchMode,
    ) -> Result<LoadOutcome, FetchError> {
        let slot = R::slot(&self.caches);

        let (generation, epoch) = {
            let mut state = slot.lock();
            state.generation += 1;

            if mode == FetchMode::PreferCache {
                let fresh = state
                    .entries
                    .get(filter)
                    .filter(|entry| entry.fetched_at.elapsed() < self.freshness)
                    .map(|entry| (Arc::clone(&entry.records), entry.fetched_on));
                if let Some((records, fetched_on)) = fresh {
                    let count = records.len();
                    state.published = records;
                    state.published_filter = Some(filter.clone());
                    state.published_at = Some(fetched_on);
                    state.loading = false;
                    state.error = None;
                    debug!(kind = ?R::KIND, %filter, records = count, "serving cached records");
                    return Ok(LoadOutcome::Cached { records: count });
                }
            }

            state.loading = true;
            (state.generation, state.epoch)
        };

        debug!(kind = ?R::KIND, %filter, generation, "issuing record query");
        let result = self.run_query::<R>(filter).await;

        let mut state = slot.lock();
        let current = state.generation == generation && state.epoch == epoch;

        match result {
            Ok(records) => {
                let count = records.len();
                let fetched_on = Utc::now();
                if state.epoch == epoch {
                    state.entries.insert(
                        filter.clone(),
                        CacheEntry {
                            records: Arc::clone(&records),
                            fetched_at: Instant::now(),
                            fetched_on,
                        },
                    );
                }

                if !current {
                    debug!(kind = ?R::KIND, %filter, generation, "discarding superseded response");
                    return Ok(LoadOutcome::Superseded);
                }

                state.published = records;
                state.published_filter = Some(filter.clone());
                state.published_at = Some(fetched_on);
                state.loading = false;
                state.error = None;
                info!(kind = ?R::KIND, %filter, records = count, "records loaded");
                Ok(LoadOutcome::Fetched { records: count })
            }
            Err(err) => {
                if !current {
                    debug!(kind = ?R::KIND, %filter, generation, error = %err, "discarding superseded failure");
                    return Ok(LoadOutcome::Superseded);
                }

                warn!(kind = ?R::KIND, %filter, error = %err, "record query failed");
                state.loading = false;
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_query<R: Record>(&self, filter: &StatusFilter) -> Result<Arc<Vec<R>>, FetchError> {
        let store = Arc::clone(&self.store);
        let query = R::KIND.query(filter.as_status());

        let documents = tokio::task::spawn_blocking(move || store.query(&query))
            .await
            .map_err(|err| FetchError::Interrupted(err.to_string()))??;

        Ok(Arc::new(decode_all::<R>(&documents, Utc::now())))
    }

    /// Write a new status for one record and drop the kind's cached lists.
    pub async fn write_status<R: Cached>(
        &self,
        id: &DocumentId,
        status: R::Status,
    ) -> Result<(), FetchError> {
        let store = Arc::clone(&self.store);
        let target = id.clone();

        tokio::task::spawn_blocking(move || {
            store.update_status(R::KIND.collection(), &target, status.as_str())
        })
        .await
        .map_err(|err| FetchError::Interrupted(err.to_string()))??;

        self.invalidate::<R>();
        info!(kind = ?R::KIND, id = %id, status = status.as_str(), "record status updated");
        Ok(())
    }

    pub fn snapshot<R: Cached>(&self) -> SectionSnapshot<R> {
        let state = R::slot(&self.caches).lock();
        SectionSnapshot {
            records: Arc::clone(&state.published),
            filter: state.published_filter.clone(),
            fetched_at: state.published_at,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Drop cached entries for `R` so the next load queries the store.
    pub fn invalidate<R: Cached>(&self) {
        R::slot(&self.caches).lock().entries.clear();
    }

    /// Forget every cached and published list; in-flight responses are discarded.
    pub fn clear(&self) {
        self.clear_kind::<CourseApplication>();
        self.clear_kind::<ProjectRequest>();
        self.clear_kind::<ContactMessage>();
        self.clear_kind::<JobApplication>();
    }

    fn clear_kind<R: Cached>(&self) {
        let mut state = R::slot(&self.caches).lock();
        let epoch = state.epoch + 1;
        let generation = state.generation + 1;
        *state = KindState {
            epoch,
            generation,
            ..KindState::default()
        };
    }

    pub fn kind_status(&self, kind: RecordKind) -> KindStatus {
        match kind {
            RecordKind::CourseApplication => self.status_of::<CourseApplication>(),
            RecordKind::ProjectRequest => self.status_of::<ProjectRequest>(),
            RecordKind::ContactMessage => self.status_of::<ContactMessage>(),
            RecordKind::JobApplication => self.status_of::<JobApplication>(),
        }
    }

    fn status_of<R: Cached>(&self) -> KindStatus {
        let state = R::slot(&self.caches).lock();
        KindStatus {
            kind: R::KIND,
            label: R::KIND.label(),
            total: state.published.len(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

/// Loading/error badge for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindStatus {
    pub kind: RecordKind,
    pub label: &'static str,
    pub total: usize,
    pub loading: bool,
    pub error: Option<String>,
}
