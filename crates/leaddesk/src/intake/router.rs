use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::{
    CareersForm, ContactForm, EnrollmentForm, IntakeError, IntakeService, ProjectForm, Submission,
};
use crate::store::DocumentStore;

/// Public form endpoints under `/api/v1/forms`.
pub fn intake_router<S>(service: Arc<IntakeService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/forms/academy",
            post(submit_handler::<S, EnrollmentForm>),
        )
        .route(
            "/api/v1/forms/projects",
            post(submit_handler::<S, ProjectForm>),
        )
        .route(
            "/api/v1/forms/contact",
            post(submit_handler::<S, ContactForm>),
        )
        .route(
            "/api/v1/forms/careers",
            post(submit_handler::<S, CareersForm>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, F>(
    State(service): State<Arc<IntakeService<S>>>,
    Json(form): Json<F>,
) -> Response
where
    S: DocumentStore + 'static,
    F: Submission,
{
    match service.submit(form) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntakeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::InvalidEmail => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
        });
        (self.status_code(), Json(payload)).into_response()
    }
}
