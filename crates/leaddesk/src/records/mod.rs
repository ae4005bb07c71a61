//! Typed views over the four lead collections.
//!
//! Every record is produced by a lenient decoder: a missing or malformed field
//! degrades to its default instead of failing the surrounding list.

mod decode;
pub mod domain;
pub mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{CollectionQuery, Document, DocumentId};

pub use domain::{ContactMessage, CourseApplication, JobApplication, ProjectRequest};
pub use status::{JobStatus, LifecycleStatus, MessageStatus, ReviewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    CourseApplication,
    ProjectRequest,
    ContactMessage,
    JobApplication,
}

impl RecordKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::CourseApplication,
            Self::ProjectRequest,
            Self::ContactMessage,
            Self::JobApplication,
        ]
    }

    pub const fn collection(self) -> &'static str {
        match self {
            Self::CourseApplication => "academy_applications",
            Self::ProjectRequest => "projects",
            Self::ContactMessage => "contactMessages",
            Self::JobApplication => "applications",
        }
    }

    /// Timestamp field the collection is ordered by.
    pub const fn order_field(self) -> &'static str {
        match self {
            Self::ContactMessage => "timestamp",
            _ => "createdAt",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CourseApplication => "Course Applications",
            Self::ProjectRequest => "Projects",
            Self::ContactMessage => "Messages",
            Self::JobApplication => "Job Applications",
        }
    }

    pub const fn export_slug(self) -> &'static str {
        match self {
            Self::CourseApplication => "course-applications",
            Self::ProjectRequest => "projects",
            Self::ContactMessage => "messages",
            Self::JobApplication => "job-applications",
        }
    }

    pub fn query(self, status: Option<&str>) -> CollectionQuery {
        let query = CollectionQuery::all(self.collection(), self.order_field());
        match status {
            Some(status) => query.with_status(status),
            None => query,
        }
    }

    /// Whether `raw` names a status in this kind's lifecycle.
    pub fn accepts_status(self, raw: &str) -> bool {
        match self {
            Self::CourseApplication | Self::ProjectRequest => ReviewStatus::parse(raw).is_some(),
            Self::ContactMessage => MessageStatus::parse(raw).is_some(),
            Self::JobApplication => JobStatus::parse(raw).is_some(),
        }
    }
}

/// A decoded lead record.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    const KIND: RecordKind;
    type Status: LifecycleStatus;

    /// Decode a raw document; `fetched_at` stands in for an unresolvable timestamp.
    fn decode(document: &Document, fetched_at: DateTime<Utc>) -> Self;
    fn id(&self) -> &DocumentId;
    fn status(&self) -> Self::Status;
    fn created_at(&self) -> DateTime<Utc>;
    /// Fields matched by free-text search.
    fn search_fields(&self) -> [&str; 3];
}

pub fn decode_all<R: Record>(documents: &[Document], fetched_at: DateTime<Utc>) -> Vec<R> {
    documents
        .iter()
        .map(|document| R::decode(document, fetched_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_queries_order_by_timestamp_field() {
        let query = RecordKind::ContactMessage.query(Some("unread"));
        assert_eq!(query.collection, "contactMessages");
        assert_eq!(query.order_by, "timestamp");
        assert_eq!(query.status.as_deref(), Some("unread"));

        let all = RecordKind::JobApplication.query(None);
        assert_eq!(all.collection, "applications");
        assert_eq!(all.order_by, "createdAt");
        assert!(all.status.is_none());
    }

    #[test]
    fn accepts_status_follows_each_lifecycle() {
        assert!(RecordKind::JobApplication.accepts_status("shortlisted"));
        assert!(!RecordKind::ProjectRequest.accepts_status("shortlisted"));
        assert!(RecordKind::ContactMessage.accepts_status("read"));
    }
}
