use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decode::FieldReader;
use super::status::{JobStatus, MessageStatus, ReviewStatus};
use super::{Record, RecordKind};
use crate::store::{Document, DocumentId};

/// Academy enrollment submitted through the join-academy form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseApplication {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub program: String,
    pub experience: String,
    pub start_date: String,
    pub reason: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for CourseApplication {
    const KIND: RecordKind = RecordKind::CourseApplication;
    type Status = ReviewStatus;

    fn decode(document: &Document, fetched_at: DateTime<Utc>) -> Self {
        let fields = FieldReader::new(&document.fields);
        let created_at = fields.timestamp(&["createdAt"]).unwrap_or(fetched_at);

        Self {
            id: document.id.clone(),
            name: fields.text("name"),
            email: fields.text("email"),
            phone: fields.text("phone"),
            program: fields.text("program"),
            experience: fields.text("experience"),
            start_date: fields.text("startDate"),
            reason: fields.text("reason"),
            status: fields.status(),
            created_at,
            updated_at: fields.timestamp(&["updatedAt"]).unwrap_or(created_at),
        }
    }

    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn status(&self) -> ReviewStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> [&str; 3] {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.program.as_str(),
        ]
    }
}

/// Client project brief from the start-a-project form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub project_type: String,
    pub budget: String,
    pub timeline: String,
    pub description: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for ProjectRequest {
    const KIND: RecordKind = RecordKind::ProjectRequest;
    type Status = ReviewStatus;

    fn decode(document: &Document, fetched_at: DateTime<Utc>) -> Self {
        let fields = FieldReader::new(&document.fields);

        Self {
            id: document.id.clone(),
            name: fields.text("name"),
            email: fields.text("email"),
            company: fields.text("company"),
            project_type: fields.text("projectType"),
            budget: fields.text("budget"),
            timeline: fields.text("timeline"),
            description: fields.text("description"),
            status: fields.status(),
            created_at: fields
                .timestamp(&["createdAt", "submittedAt"])
                .unwrap_or(fetched_at),
        }
    }

    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn status(&self) -> ReviewStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> [&str; 3] {
        [
            self.name.as_str(),
            self.company.as_str(),
            self.project_type.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for ContactMessage {
    const KIND: RecordKind = RecordKind::ContactMessage;
    type Status = MessageStatus;

    fn decode(document: &Document, fetched_at: DateTime<Utc>) -> Self {
        let fields = FieldReader::new(&document.fields);

        Self {
            id: document.id.clone(),
            name: fields.text("name"),
            email: fields.text("email"),
            subject: fields.text("subject"),
            message: fields.text("message"),
            status: fields.status(),
            created_at: fields
                .timestamp(&["timestamp", "createdAt"])
                .unwrap_or(fetched_at),
        }
    }

    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn status(&self) -> MessageStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> [&str; 3] {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.subject.as_str(),
        ]
    }
}

/// Careers submission. The resume itself lives in object storage; only its URL is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub experience: String,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for JobApplication {
    const KIND: RecordKind = RecordKind::JobApplication;
    type Status = JobStatus;

    fn decode(document: &Document, fetched_at: DateTime<Utc>) -> Self {
        let fields = FieldReader::new(&document.fields);

        // The careers form stores links instead of a cover letter.
        let cover_letter = match fields.optional_text("coverLetter") {
            Some(letter) => letter,
            None => format!(
                "LinkedIn: {}\nGitHub: {}\nPortfolio: {}",
                fields.text_or("linkedin", "N/A"),
                fields.text_or("github", "N/A"),
                fields.text_or("portfolio", "N/A"),
            ),
        };

        Self {
            id: document.id.clone(),
            name: fields.text("name"),
            email: fields.text("email"),
            phone: fields.text("phone"),
            position: fields.first_text(&["role", "position"]),
            experience: fields.text_or("experience", "Not specified"),
            cover_letter,
            resume_url: fields.optional_text("resumeUrl"),
            status: fields.status(),
            created_at: fields.timestamp(&["createdAt"]).unwrap_or(fetched_at),
        }
    }

    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn status(&self) -> JobStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn search_fields(&self) -> [&str; 3] {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.position.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn document(id: &str, fields: Value) -> Document {
        let Value::Object(fields) = fields else {
            panic!("fixture must be an object");
        };
        Document {
            id: DocumentId(id.to_string()),
            fields,
        }
    }

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn empty_documents_decode_to_defaults() {
        let course = CourseApplication::decode(&document("c1", json!({})), fetched_at());
        assert_eq!(course.name, "");
        assert_eq!(course.status, ReviewStatus::Pending);
        assert_eq!(course.created_at, fetched_at());
        assert_eq!(course.updated_at, course.created_at);

        let message = ContactMessage::decode(&document("m1", json!({})), fetched_at());
        assert_eq!(message.status, MessageStatus::Unread);
        assert_eq!(message.subject, "");
    }

    #[test]
    fn job_applications_prefer_role_and_synthesize_cover_letters() {
        let job = JobApplication::decode(
            &document(
                "j1",
                json!({
                    "name": "Ada",
                    "role": "Software Engineer",
                    "position": "ignored",
                    "linkedin": "in/ada",
                    "resumeUrl": "",
                    "status": "reviewing"
                }),
            ),
            fetched_at(),
        );

        assert_eq!(job.position, "Software Engineer");
        assert_eq!(job.experience, "Not specified");
        assert_eq!(
            job.cover_letter,
            "LinkedIn: in/ada\nGitHub: N/A\nPortfolio: N/A"
        );
        assert_eq!(job.resume_url, None);
        assert_eq!(job.status, JobStatus::Reviewing);
    }

    #[test]
    fn contact_messages_normalize_server_timestamps() {
        let message = ContactMessage::decode(
            &document(
                "m2",
                json!({
                    "name": "Grace",
                    "timestamp": { "seconds": 1_700_000_000, "nanoseconds": 0 },
                    "status": "replied"
                }),
            ),
            fetched_at(),
        );
        assert_eq!(message.created_at.timestamp(), 1_700_000_000);
        assert_eq!(message.status, MessageStatus::Replied);
    }

    #[test]
    fn project_requests_keep_their_search_fields() {
        let project = ProjectRequest::decode(
            &document(
                "p1",
                json!({ "name": "Lin", "company": "Acme", "projectType": "Mobile App", "budget": 12000 }),
            ),
            fetched_at(),
        );
        assert_eq!(project.search_fields(), ["Lin", "Acme", "Mobile App"]);
        assert_eq!(project.budget, "12000");
    }
}
