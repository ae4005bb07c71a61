use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    CsvExport, Dashboard, DashboardError, ExportError, FetchError, LoadSummary, Section,
    StatusFilter, ViewState,
};
use crate::records::RecordKind;
use crate::store::{DocumentId, DocumentStore, StoreError};

type Shared<S> = State<Arc<Dashboard<S>>>;

/// Admin endpoints under `/api/v1/admin`.
pub fn dashboard_router<S>(dashboard: Arc<Dashboard<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/admin/login", post(login_handler::<S>))
        .route("/api/v1/admin/logout", post(logout_handler::<S>))
        .route("/api/v1/admin/state", get(state_handler::<S>))
        .route("/api/v1/admin/view", put(view_handler::<S>))
        .route("/api/v1/admin/refresh", post(refresh_handler::<S>))
        .route("/api/v1/admin/overview", get(overview_handler::<S>))
        .route("/api/v1/admin/sections/:section", get(section_handler::<S>))
        .route(
            "/api/v1/admin/sections/:section/select/:id",
            post(select_handler::<S>),
        )
        .route(
            "/api/v1/admin/sections/:section/export",
            get(export_handler::<S>),
        )
        .route(
            "/api/v1/admin/sections/:section/records/:id/status",
            patch(status_handler::<S>),
        )
        .with_state(dashboard)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Partial view change; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct ViewUpdate {
    pub section: Option<Section>,
    pub search: Option<String>,
    pub status_filter: Option<StatusFilter>,
}

#[derive(Debug, Serialize)]
struct ViewResponse {
    view: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    loads: Option<LoadSummary>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

fn record_kind(raw: &str) -> Result<RecordKind, DashboardError> {
    Section::parse(raw)
        .and_then(Section::record_kind)
        .ok_or_else(|| DashboardError::UnknownSection(raw.to_string()))
}

pub(crate) async fn login_handler<S>(
    State(dashboard): Shared<S>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match dashboard.login(&request.username, &request.password).await {
        Ok(loads) => {
            let payload = json!({
                "session": dashboard.snapshot().session,
                "loads": loads,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn logout_handler<S>(State(dashboard): Shared<S>) -> StatusCode
where
    S: DocumentStore + 'static,
{
    dashboard.logout();
    StatusCode::NO_CONTENT
}

pub(crate) async fn state_handler<S>(State(dashboard): Shared<S>) -> Response
where
    S: DocumentStore + 'static,
{
    Json(dashboard.snapshot()).into_response()
}

pub(crate) async fn view_handler<S>(
    State(dashboard): Shared<S>,
    Json(update): Json<ViewUpdate>,
) -> Result<Response, DashboardError>
where
    S: DocumentStore + 'static,
{
    let section = update.section.unwrap_or_else(|| dashboard.view().section);
    dashboard.select_section(section)?;
    if let Some(search) = update.search.as_deref() {
        dashboard.set_search(search)?;
    }
    let loads = match update.status_filter {
        Some(filter) => Some(dashboard.set_status_filter(filter).await?),
        None => None,
    };

    let body = ViewResponse {
        view: dashboard.view(),
        loads,
    };
    Ok(Json(body).into_response())
}

pub(crate) async fn refresh_handler<S>(
    State(dashboard): Shared<S>,
) -> Result<Json<LoadSummary>, DashboardError>
where
    S: DocumentStore + 'static,
{
    dashboard.refresh().await.map(Json)
}

pub(crate) async fn overview_handler<S>(
    State(dashboard): Shared<S>,
) -> Result<Response, DashboardError>
where
    S: DocumentStore + 'static,
{
    Ok(Json(dashboard.overview()?).into_response())
}

pub(crate) async fn section_handler<S>(
    State(dashboard): Shared<S>,
    Path(section): Path<String>,
) -> Result<Response, DashboardError>
where
    S: DocumentStore + 'static,
{
    let page = dashboard.section(record_kind(&section)?)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn select_handler<S>(
    State(dashboard): Shared<S>,
    Path((section, id)): Path<(String, String)>,
) -> Result<Json<ViewState>, DashboardError>
where
    S: DocumentStore + 'static,
{
    let kind = record_kind(&section)?;
    dashboard
        .select_record(kind, Some(DocumentId(id)))
        .map(Json)
}

pub(crate) async fn export_handler<S>(
    State(dashboard): Shared<S>,
    Path(section): Path<String>,
) -> Result<Response, DashboardError>
where
    S: DocumentStore + 'static,
{
    let export = dashboard.export(record_kind(&section)?)?;
    Ok(csv_response(export))
}

pub(crate) async fn status_handler<S>(
    State(dashboard): Shared<S>,
    Path((section, id)): Path<(String, String)>,
    Json(update): Json<StatusUpdate>,
) -> Result<Response, DashboardError>
where
    S: DocumentStore + 'static,
{
    let kind = record_kind(&section)?;
    let outcome = dashboard
        .update_status(kind, &DocumentId(id), &update.status)
        .await?;
    Ok(Json(outcome).into_response())
}

fn csv_response(export: CsvExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, export.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response()
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Login(_) => StatusCode::UNAUTHORIZED,
            Self::UnknownSection(_) | Self::InvalidStatus { .. } => StatusCode::BAD_REQUEST,
            Self::Export(ExportError::Empty) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fetch(FetchError::Store(StoreError::NotFound)) => StatusCode::NOT_FOUND,
            Self::Fetch(FetchError::Store(_)) => StatusCode::BAD_GATEWAY,
            Self::Fetch(FetchError::Interrupted(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
        });
        (self.status_code(), Json(payload)).into_response()
    }
}
