use serde::Serialize;

use crate::records::{
    ContactMessage, CourseApplication, JobApplication, JobStatus, LifecycleStatus,
    MessageStatus, ProjectRequest, Record, ReviewStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCountEntry {
    pub status: &'static str,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCountEntry {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricEntry {
    pub title: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionTotals {
    pub applications: usize,
    pub projects: usize,
    pub messages: usize,
    pub jobs: usize,
}

/// Counts shown next to each sidebar entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidebarBadges {
    pub unread_messages: usize,
    pub pending_jobs: usize,
    pub pending_applications: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub metrics: Vec<MetricEntry>,
    pub totals: SectionTotals,
    pub badges: SidebarBadges,
    /// Course application statuses with at least one record.
    pub application_status: Vec<StatusCountEntry>,
    pub programs: Vec<CategoryCountEntry>,
    pub has_notifications: bool,
}

impl Overview {
    pub fn build(
        applications: &[CourseApplication],
        projects: &[ProjectRequest],
        messages: &[ContactMessage],
        jobs: &[JobApplication],
    ) -> Self {
        let unread_messages = count_with_status(messages, MessageStatus::Unread);
        let pending_applications = count_with_status(applications, ReviewStatus::Pending);
        let pending_jobs = count_with_status(jobs, JobStatus::Pending);

        let metrics = vec![
            MetricEntry {
                title: "Course Applications",
                value: applications.len(),
            },
            MetricEntry {
                title: "Unread Messages",
                value: unread_messages,
            },
            MetricEntry {
                title: "Job Applications",
                value: jobs.len(),
            },
            MetricEntry {
                title: "Active Projects",
                value: count_with_status(projects, ReviewStatus::Approved),
            },
        ];

        let application_status = count_by_status(applications)
            .into_iter()
            .filter(|entry| entry.count > 0)
            .collect();

        Self {
            metrics,
            totals: SectionTotals {
                applications: applications.len(),
                projects: projects.len(),
                messages: messages.len(),
                jobs: jobs.len(),
            },
            badges: SidebarBadges {
                unread_messages,
                pending_jobs,
                pending_applications,
            },
            application_status,
            programs: count_by(applications, |application| application.program.as_str()),
            has_notifications: unread_messages > 0 || pending_applications > 0,
        }
    }
}

pub fn count_with_status<R: Record>(records: &[R], status: R::Status) -> usize {
    records
        .iter()
        .filter(|record| record.status() == status)
        .count()
}

/// One entry per lifecycle state, in lifecycle order, zero counts included.
pub fn count_by_status<R: Record>(records: &[R]) -> Vec<StatusCountEntry> {
    R::Status::ordered()
        .iter()
        .map(|status| StatusCountEntry {
            status: status.as_str(),
            status_label: status.label(),
            count: count_with_status(records, *status),
        })
        .collect()
}

/// Group by a categorical field, keeping first-seen order.
pub fn count_by<R, F>(records: &[R], key: F) -> Vec<CategoryCountEntry>
where
    F: Fn(&R) -> &str,
{
    let mut entries: Vec<CategoryCountEntry> = Vec::new();
    for record in records {
        let category = key(record);
        match entries.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => entry.count += 1,
            None => entries.push(CategoryCountEntry {
                category: category.to_string(),
                count: 1,
            }),
        }
    }
    entries
}
