use serde::{Deserialize, Serialize};

use crate::records::RecordKind;
use crate::store::DocumentId;

/// Dashboard area currently on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Overview,
    Applications,
    Projects,
    Messages,
    Jobs,
}

impl Section {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Overview,
            Self::Applications,
            Self::Projects,
            Self::Messages,
            Self::Jobs,
        ]
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Applications => "applications",
            Self::Projects => "projects",
            Self::Messages => "messages",
            Self::Jobs => "jobs",
        }
    }

    /// The record list backing this section; the overview has none of its own.
    pub const fn record_kind(self) -> Option<RecordKind> {
        match self {
            Self::Overview => None,
            Self::Applications => Some(RecordKind::CourseApplication),
            Self::Projects => Some(RecordKind::ProjectRequest),
            Self::Messages => Some(RecordKind::ContactMessage),
            Self::Jobs => Some(RecordKind::JobApplication),
        }
    }

    pub const fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::CourseApplication => Self::Applications,
            RecordKind::ProjectRequest => Self::Projects,
            RecordKind::ContactMessage => Self::Messages,
            RecordKind::JobApplication => Self::Jobs,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side status predicate. Serialized as `"all"` or the raw status value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    pub fn as_status(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }
}

impl From<String> for StatusFilter {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.is_empty() || normalized == "all" {
            Self::All
        } else {
            Self::Only(normalized)
        }
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_status().unwrap_or("all"))
    }
}

/// Selected record id per record section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub applications: Option<DocumentId>,
    pub projects: Option<DocumentId>,
    pub messages: Option<DocumentId>,
    pub jobs: Option<DocumentId>,
}

impl Selection {
    pub fn get(&self, kind: RecordKind) -> Option<&DocumentId> {
        match kind {
            RecordKind::CourseApplication => self.applications.as_ref(),
            RecordKind::ProjectRequest => self.projects.as_ref(),
            RecordKind::ContactMessage => self.messages.as_ref(),
            RecordKind::JobApplication => self.jobs.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: RecordKind) -> &mut Option<DocumentId> {
        match kind {
            RecordKind::CourseApplication => &mut self.applications,
            RecordKind::ProjectRequest => &mut self.projects,
            RecordKind::ContactMessage => &mut self.messages,
            RecordKind::JobApplication => &mut self.jobs,
        }
    }
}

/// Everything the operator has chosen on screen, owned by the controller.
///
/// Search term and status filter are shared by every record section: switching
/// sections keeps both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub section: Section,
    pub search: String,
    pub status_filter: StatusFilter,
    pub selection: Selection,
}

impl ViewState {
    pub fn select_section(&mut self, section: Section) {
        self.section = section;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Returns whether the filter actually changed.
    pub fn set_status_filter(&mut self, filter: StatusFilter) -> bool {
        if self.status_filter == filter {
            return false;
        }
        self.status_filter = filter;
        true
    }

    pub fn select(&mut self, kind: RecordKind, id: Option<DocumentId>) {
        *self.selection.slot_mut(kind) = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_round_trips_through_strings() {
        assert_eq!(StatusFilter::from("All"), StatusFilter::All);
        assert_eq!(StatusFilter::from(""), StatusFilter::All);
        assert_eq!(
            StatusFilter::from(" Pending "),
            StatusFilter::Only("pending".to_string())
        );

        let encoded = serde_json::to_string(&StatusFilter::Only("unread".to_string()))
            .expect("serializes");
        assert_eq!(encoded, "\"unread\"");
        let decoded: StatusFilter = serde_json::from_str("\"all\"").expect("deserializes");
        assert_eq!(decoded, StatusFilter::All);
    }

    #[test]
    fn switching_sections_keeps_search_and_filter() {
        let mut view = ViewState::default();
        view.set_search("ada");
        view.set_status_filter(StatusFilter::from("pending"));
        view.select_section(Section::Jobs);
        view.select_section(Section::Messages);

        assert_eq!(view.section, Section::Messages);
        assert_eq!(view.search, "ada");
        assert_eq!(view.status_filter, StatusFilter::from("pending"));
    }

    #[test]
    fn selection_is_tracked_per_record_kind() {
        let mut view = ViewState::default();
        view.select(
            RecordKind::JobApplication,
            Some(DocumentId("job-1".to_string())),
        );
        view.select(
            RecordKind::ContactMessage,
            Some(DocumentId("msg-1".to_string())),
        );
        view.select(RecordKind::ContactMessage, None);

        assert_eq!(
            view.selection.get(RecordKind::JobApplication),
            Some(&DocumentId("job-1".to_string()))
        );
        assert_eq!(view.selection.get(RecordKind::ContactMessage), None);
    }

    #[test]
    fn sections_map_onto_record_kinds() {
        for kind in RecordKind::ordered() {
            assert_eq!(Section::for_kind(kind).record_kind(), Some(kind));
        }
        assert_eq!(Section::Overview.record_kind(), None);
        assert_eq!(Section::parse("JOBS"), Some(Section::Jobs));
        assert_eq!(Section::parse("settings"), None);
    }
}
