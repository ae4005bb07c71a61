//! Admin dashboard core: login gate, cached section queries, search, aggregates,
//! and CSV export.
//!
//! [`Dashboard`] owns the view state for a single operator. Every data operation
//! is refused while signed out, so no query reaches the store before a
//! successful login.

pub mod export;
pub mod fetch;
pub mod filter;
pub mod router;
pub mod session;
pub mod summary;
pub mod view;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::records::{
    ContactMessage, CourseApplication, JobApplication, LifecycleStatus, ProjectRequest, Record,
    RecordKind,
};
use crate::store::{DocumentId, DocumentStore};

pub use export::{export_filename, to_csv, CsvExport, ExportError};
pub use fetch::{Cached, FetchError, FetchLayer, FetchMode, KindStatus, LoadOutcome};
pub use router::dashboard_router;
pub use session::{LoginError, SessionGate, SessionState};
pub use summary::Overview;
pub use view::{Section, Selection, StatusFilter, ViewState};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("sign in to use the dashboard")]
    Unauthenticated,
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("unknown record section: {0}")]
    UnknownSection(String),
    #[error("{status:?} is not a valid status for {kind}")]
    InvalidStatus { kind: &'static str, status: String },
}

/// Result of loading one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindLoad {
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LoadOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KindLoad {
    fn new(kind: RecordKind, result: Result<LoadOutcome, FetchError>) -> Self {
        match result {
            Ok(outcome) => Self {
                kind,
                outcome: Some(outcome),
                error: None,
            },
            Err(err) => Self {
                kind,
                outcome: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Per-kind results of a fan-out over all four sections. Each section settles
/// independently; one failure never blocks the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loads: Vec<KindLoad>,
}

impl LoadSummary {
    pub fn failures(&self) -> impl Iterator<Item = &KindLoad> {
        self.loads.iter().filter(|load| load.error.is_some())
    }

    pub fn get(&self, kind: RecordKind) -> Option<&KindLoad> {
        self.loads.iter().find(|load| load.kind == kind)
    }
}

/// One record section as the operator sees it.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView<R> {
    pub kind: RecordKind,
    pub label: &'static str,
    /// Records published for the active status filter, before search.
    pub total: usize,
    pub records: Vec<R>,
    pub search: String,
    pub status_filter: StatusFilter,
    pub selected: Option<R>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SectionPage {
    Applications(SectionView<CourseApplication>),
    Projects(SectionView<ProjectRequest>),
    Messages(SectionView<ContactMessage>),
    Jobs(SectionView<JobApplication>),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub session: SessionState,
    pub view: ViewState,
    pub refreshing: bool,
    pub sections: Vec<KindStatus>,
}

pub struct Dashboard<S> {
    session: SessionGate,
    fetch: FetchLayer<S>,
    view: Mutex<ViewState>,
    refreshes: AtomicUsize,
}

/// Keeps the refreshing flag raised until dropped, even if the refresh is cancelled.
struct RefreshGuard<'a>(&'a AtomicUsize);

impl<'a> RefreshGuard<'a> {
    fn raise(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S> Dashboard<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, config: &DashboardConfig) -> Self {
        Self {
            session: SessionGate::new(config.credentials.clone(), config.login_delay),
            fetch: FetchLayer::new(store, config.freshness),
            view: Mutex::new(ViewState::default()),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn fetch_layer(&self) -> &FetchLayer<S> {
        &self.fetch
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshes.load(Ordering::SeqCst) > 0
    }

    /// Check credentials, then issue the four initial queries concurrently.
    ///
    /// A rejected attempt leaves the gate closed and drops whatever an earlier
    /// session had loaded.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoadSummary, DashboardError> {
        if let Err(err) = self.session.login(username, password).await {
            self.fetch.clear();
            *self.view_mut() = ViewState::default();
            return Err(err.into());
        }
        Ok(self.load_all(FetchMode::PreferCache).await)
    }

    /// Sign out and forget everything loaded on the operator's behalf.
    pub fn logout(&self) {
        self.session.logout();
        self.fetch.clear();
        *self.view_mut() = ViewState::default();
        info!("admin signed out");
    }

    pub fn select_section(&self, section: Section) -> Result<ViewState, DashboardError> {
        self.ensure_authenticated()?;
        let mut view = self.view_mut();
        view.select_section(section);
        Ok(view.clone())
    }

    pub fn set_search(&self, term: &str) -> Result<ViewState, DashboardError> {
        self.ensure_authenticated()?;
        let mut view = self.view_mut();
        view.set_search(term);
        Ok(view.clone())
    }

    /// Change the status filter and re-query every section for it.
    pub async fn set_status_filter(
        &self,
        filter: StatusFilter,
    ) -> Result<LoadSummary, DashboardError> {
        self.ensure_authenticated()?;
        if self.view_mut().set_status_filter(filter.clone()) {
            info!(%filter, "status filter changed");
        }
        Ok(self.load_all(FetchMode::PreferCache).await)
    }

    /// Remember `id` as the selected record of `kind`. It is not checked against
    /// the loaded list; a stale id simply resolves to no selection.
    pub fn select_record(
        &self,
        kind: RecordKind,
        id: Option<DocumentId>,
    ) -> Result<ViewState, DashboardError> {
        self.ensure_authenticated()?;
        let mut view = self.view_mut();
        view.select(kind, id);
        Ok(view.clone())
    }

    /// Force-reload all four sections; the refreshing flag stays raised until
    /// every load has settled.
    pub async fn refresh(&self) -> Result<LoadSummary, DashboardError> {
        self.ensure_authenticated()?;
        let _guard = RefreshGuard::raise(&self.refreshes);
        info!("refreshing all sections");

        let summary = self.load_all(FetchMode::Force).await;
        for failure in summary.failures() {
            warn!(kind = ?failure.kind, error = ?failure.error, "section failed to refresh");
        }
        Ok(summary)
    }

    pub fn section(&self, kind: RecordKind) -> Result<SectionPage, DashboardError> {
        self.ensure_authenticated()?;
        let page = match kind {
            RecordKind::CourseApplication => SectionPage::Applications(self.visible_section()),
            RecordKind::ProjectRequest => SectionPage::Projects(self.visible_section()),
            RecordKind::ContactMessage => SectionPage::Messages(self.visible_section()),
            RecordKind::JobApplication => SectionPage::Jobs(self.visible_section()),
        };
        Ok(page)
    }

    /// Typed view of one section: published records narrowed by the search term.
    ///
    /// The selection resolves against the list as published now, so a record that
    /// left the active filter (after `update_status`, say) reads as unselected.
    pub fn section_view<R: Cached>(&self) -> Result<SectionView<R>, DashboardError> {
        self.ensure_authenticated()?;
        Ok(self.visible_section())
    }

    fn visible_section<R: Cached>(&self) -> SectionView<R> {
        let snapshot = self.fetch.snapshot::<R>();
        let view = self.view();
        let selected = view
            .selection
            .get(R::KIND)
            .and_then(|id| snapshot.records.iter().find(|record| record.id() == id))
            .cloned();

        SectionView {
            kind: R::KIND,
            label: R::KIND.label(),
            total: snapshot.records.len(),
            records: filter::search(&snapshot.records, &view.search),
            search: view.search,
            status_filter: view.status_filter,
            selected,
            fetched_at: snapshot.fetched_at,
            loading: snapshot.loading,
            error: snapshot.error,
        }
    }

    /// Aggregates over the published lists; the search term does not apply.
    pub fn overview(&self) -> Result<Overview, DashboardError> {
        self.ensure_authenticated()?;
        Ok(Overview::build(
            &self.fetch.snapshot::<CourseApplication>().records,
            &self.fetch.snapshot::<ProjectRequest>().records,
            &self.fetch.snapshot::<ContactMessage>().records,
            &self.fetch.snapshot::<JobApplication>().records,
        ))
    }

    /// Render the section's visible (searched) records as a CSV download.
    pub fn export(&self, kind: RecordKind) -> Result<CsvExport, DashboardError> {
        self.ensure_authenticated()?;
        match kind {
            RecordKind::CourseApplication => self.export_kind::<CourseApplication>(),
            RecordKind::ProjectRequest => self.export_kind::<ProjectRequest>(),
            RecordKind::ContactMessage => self.export_kind::<ContactMessage>(),
            RecordKind::JobApplication => self.export_kind::<JobApplication>(),
        }
    }

    fn export_kind<R: Cached>(&self) -> Result<CsvExport, DashboardError> {
        let visible = self.visible_section::<R>().records;
        let today = Utc::now().date_naive();
        export::export(&visible, R::KIND.export_slug(), today).map_err(|err| {
            warn!(kind = ?R::KIND, error = %err, "export refused");
            DashboardError::from(err)
        })
    }

    /// Move one record to another state of its lifecycle, then reload the section.
    pub async fn update_status(
        &self,
        kind: RecordKind,
        id: &DocumentId,
        status: &str,
    ) -> Result<LoadOutcome, DashboardError> {
        self.ensure_authenticated()?;
        match kind {
            RecordKind::CourseApplication => self.update_kind::<CourseApplication>(id, status).await,
            RecordKind::ProjectRequest => self.update_kind::<ProjectRequest>(id, status).await,
            RecordKind::ContactMessage => self.update_kind::<ContactMessage>(id, status).await,
            RecordKind::JobApplication => self.update_kind::<JobApplication>(id, status).await,
        }
    }

    async fn update_kind<R: Cached>(
        &self,
        id: &DocumentId,
        raw: &str,
    ) -> Result<LoadOutcome, DashboardError> {
        let status = <R::Status as LifecycleStatus>::parse(raw).ok_or_else(|| {
            DashboardError::InvalidStatus {
                kind: R::KIND.label(),
                status: raw.to_string(),
            }
        })?;

        self.fetch.write_status::<R>(id, status).await?;
        let filter = self.view().status_filter;
        Ok(self.fetch.load::<R>(&filter, FetchMode::Force).await?)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            session: self.session.state(),
            view: self.view(),
            refreshing: self.is_refreshing(),
            sections: RecordKind::ordered()
                .into_iter()
                .map(|kind| self.fetch.kind_status(kind))
                .collect(),
        }
    }

    pub fn view(&self) -> ViewState {
        self.view_mut().clone()
    }

    async fn load_all(&self, mode: FetchMode) -> LoadSummary {
        let filter = self.view().status_filter;
        let (courses, projects, messages, jobs) = tokio::join!(
            self.fetch.load::<CourseApplication>(&filter, mode),
            self.fetch.load::<ProjectRequest>(&filter, mode),
            self.fetch.load::<ContactMessage>(&filter, mode),
            self.fetch.load::<JobApplication>(&filter, mode),
        );

        LoadSummary {
            loads: vec![
                KindLoad::new(RecordKind::CourseApplication, courses),
                KindLoad::new(RecordKind::ProjectRequest, projects),
                KindLoad::new(RecordKind::ContactMessage, messages),
                KindLoad::new(RecordKind::JobApplication, jobs),
            ],
        }
    }

    fn ensure_authenticated(&self) -> Result<(), DashboardError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(DashboardError::Unauthenticated)
        }
    }

    fn view_mut(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().expect("view state mutex poisoned")
    }
}
