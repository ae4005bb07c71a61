//! Public lead-capture forms: validation and insert-only writes.
//!
//! Every form lands in the collection its dashboard section reads, with the
//! initial lifecycle status set. Failed writes are reported to the caller and
//! never queued.

pub mod router;

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::records::{JobStatus, LifecycleStatus, MessageStatus, RecordKind, ReviewStatus};
use crate::store::{DocumentId, DocumentStore, NewDocument, StoreError};

pub use router::intake_router;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("email address must contain '@'")]
    InvalidEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A form payload that can be validated and written as a new document.
pub trait Submission: DeserializeOwned + Send + 'static {
    const KIND: RecordKind;

    fn validate(&self) -> Result<(), IntakeError>;
    fn into_document(self, submitted_at: DateTime<Utc>) -> NewDocument;
}

fn required(field: &'static str, value: &str) -> Result<(), IntakeError> {
    if value.trim().is_empty() {
        Err(IntakeError::MissingField(field))
    } else {
        Ok(())
    }
}

fn email(value: &str) -> Result<(), IntakeError> {
    required("email", value)?;
    if value.contains('@') {
        Ok(())
    } else {
        Err(IntakeError::InvalidEmail)
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Join-academy enrollment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub program: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub reason: String,
}

impl Submission for EnrollmentForm {
    const KIND: RecordKind = RecordKind::CourseApplication;

    fn validate(&self) -> Result<(), IntakeError> {
        required("name", &self.name)?;
        email(&self.email)?;
        required("program", &self.program)
    }

    fn into_document(self, submitted_at: DateTime<Utc>) -> NewDocument {
        let stamp = rfc3339(submitted_at);
        NewDocument::new()
            .set("name", self.name.trim())
            .set("email", self.email.trim())
            .set("phone", self.phone)
            .set("program", self.program)
            .set("experience", self.experience)
            .set("startDate", self.start_date)
            .set("reason", self.reason)
            .set("status", ReviewStatus::initial().as_str())
            .set("createdAt", stamp.clone())
            .set("updatedAt", stamp)
    }
}

/// Start-a-project brief.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub project_type: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
    pub description: String,
}

impl Submission for ProjectForm {
    const KIND: RecordKind = RecordKind::ProjectRequest;

    fn validate(&self) -> Result<(), IntakeError> {
        required("name", &self.name)?;
        email(&self.email)?;
        required("projectType", &self.project_type)?;
        required("description", &self.description)
    }

    fn into_document(self, submitted_at: DateTime<Utc>) -> NewDocument {
        NewDocument::new()
            .set("name", self.name.trim())
            .set("email", self.email.trim())
            .set("company", self.company)
            .set("projectType", self.project_type)
            .set("budget", self.budget)
            .set("timeline", self.timeline)
            .set("description", self.description)
            .set("status", ReviewStatus::initial().as_str())
            .set("createdAt", rfc3339(submitted_at))
    }
}

/// Contact message. The store stamps `timestamp` when it commits the write.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
}

impl Submission for ContactForm {
    const KIND: RecordKind = RecordKind::ContactMessage;

    fn validate(&self) -> Result<(), IntakeError> {
        required("name", &self.name)?;
        if let Some(address) = self.email.as_deref().filter(|raw| !raw.trim().is_empty()) {
            email(address)?;
        }
        required("subject", &self.subject)?;
        required("message", &self.message)
    }

    fn into_document(self, _submitted_at: DateTime<Utc>) -> NewDocument {
        let document = NewDocument::new()
            .set("name", self.name.trim())
            .set("subject", self.subject)
            .set("message", self.message)
            .set("status", MessageStatus::initial().as_str())
            .server_timestamp("timestamp");
        match self.email {
            Some(address) if !address.trim().is_empty() => document.set("email", address.trim()),
            _ => document,
        }
    }
}

/// Careers application. Résumé upload happens elsewhere; only its URL is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareersForm {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub portfolio: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl Submission for CareersForm {
    const KIND: RecordKind = RecordKind::JobApplication;

    fn validate(&self) -> Result<(), IntakeError> {
        required("name", &self.name)?;
        email(&self.email)?;
        required("role", &self.role)
    }

    fn into_document(self, submitted_at: DateTime<Utc>) -> NewDocument {
        let stamp = rfc3339(submitted_at);
        let document = NewDocument::new()
            .set("name", self.name.trim())
            .set("email", self.email.trim())
            .set("role", self.role)
            .set("linkedin", self.linkedin)
            .set("github", self.github)
            .set("portfolio", self.portfolio)
            .set("status", JobStatus::initial().as_str())
            .set("createdAt", stamp.clone())
            .set("updatedAt", stamp);
        match self.resume_url {
            Some(url) => document.set("resumeUrl", url),
            None => document,
        }
    }
}

/// Validates submissions and writes them to the store.
pub struct IntakeService<S> {
    store: Arc<S>,
}

impl<S> IntakeService<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn submit<F: Submission>(&self, form: F) -> Result<DocumentId, IntakeError> {
        if let Err(err) = form.validate() {
            warn!(kind = ?F::KIND, error = %err, "submission rejected");
            return Err(err);
        }

        let collection = F::KIND.collection();
        let id = self
            .store
            .insert(collection, form.into_document(Utc::now()))
            .map_err(|err| {
                warn!(kind = ?F::KIND, error = %err, "submission write failed");
                IntakeError::from(err)
            })?;

        info!(kind = ?F::KIND, %id, collection, "submission stored");
        Ok(id)
    }
}
