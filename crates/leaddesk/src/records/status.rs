use serde::{Deserialize, Serialize};

/// Status values for a record kind, listed in lifecycle order.
///
/// The first entry of [`LifecycleStatus::ordered`] is the initial state, which is
/// also what absent or unrecognized values decode to.
pub trait LifecycleStatus:
    Copy + Eq + std::fmt::Debug + Serialize + Send + Sync + 'static
{
    fn ordered() -> &'static [Self];
    fn as_str(self) -> &'static str;
    fn label(self) -> &'static str;

    fn initial() -> Self {
        Self::ordered()[0]
    }

    fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ordered()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
    }

    fn parse_or_initial(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_else(Self::initial)
    }
}

/// Review lifecycle shared by course applications and project requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl LifecycleStatus for ReviewStatus {
    fn ordered() -> &'static [Self] {
        &[Self::Pending, Self::Approved, Self::Rejected]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
    Replied,
}

impl LifecycleStatus for MessageStatus {
    fn ordered() -> &'static [Self] {
        &[Self::Unread, Self::Read, Self::Replied]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Replied => "replied",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Unread => "Unread",
            Self::Read => "Read",
            Self::Replied => "Replied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Reviewing,
    Shortlisted,
    Rejected,
}

impl LifecycleStatus for JobStatus {
    fn ordered() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Reviewing,
            Self::Shortlisted,
            Self::Rejected,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Reviewing => "Reviewing",
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_first_lifecycle_entry() {
        assert_eq!(ReviewStatus::initial(), ReviewStatus::Pending);
        assert_eq!(MessageStatus::initial(), MessageStatus::Unread);
        assert_eq!(JobStatus::initial(), JobStatus::Pending);
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(JobStatus::parse(" Shortlisted "), Some(JobStatus::Shortlisted));
        assert_eq!(MessageStatus::parse("REPLIED"), Some(MessageStatus::Replied));
    }

    #[test]
    fn unrecognized_or_absent_values_fall_back_to_initial() {
        assert_eq!(
            ReviewStatus::parse_or_initial(Some("archived")),
            ReviewStatus::Pending
        );
        assert_eq!(MessageStatus::parse_or_initial(None), MessageStatus::Unread);
        assert_eq!(
            JobStatus::parse_or_initial(Some("approved")),
            JobStatus::Pending,
            "approved is not part of the job lifecycle"
        );
    }
}
