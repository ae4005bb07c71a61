use crate::records::Record;

/// Case-insensitive substring match over the record's search fields.
///
/// An empty term matches everything; otherwise any single field containing the
/// term is enough.
pub fn matches<R: Record>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn search<R: Record>(records: &[R], term: &str) -> Vec<R> {
    records
        .iter()
        .filter(|record| matches(*record, term))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CourseApplication, JobApplication, JobStatus, ReviewStatus};
    use crate::store::DocumentId;
    use chrono::{TimeZone, Utc};

    fn job(id: &str, name: &str, email: &str, position: &str) -> JobApplication {
        JobApplication {
            id: DocumentId(id.to_string()),
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            position: position.to_string(),
            experience: "Not specified".to_string(),
            cover_letter: String::new(),
            resume_url: None,
            status: JobStatus::Pending,
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid"),
        }
    }

    fn jobs() -> Vec<JobApplication> {
        vec![
            job("1", "Ada Lovelace", "ada@x.com", "Software Engineer"),
            job("2", "Grace Hopper", "grace@navy.mil", "Compiler Lead"),
            job("3", "", "", "Designer"),
        ]
    }

    fn ids(records: &[JobApplication]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_term_is_identity() {
        assert_eq!(search(&jobs(), ""), jobs());
    }

    #[test]
    fn matches_any_single_field() {
        assert_eq!(ids(&search(&jobs(), "navy")), vec!["2"]);
        assert_eq!(ids(&search(&jobs(), "engineer")), vec!["1"]);
        assert_eq!(ids(&search(&jobs(), "design")), vec!["3"]);
    }

    #[test]
    fn case_does_not_matter() {
        for term in ["ADA", "ada", "AdA"] {
            assert_eq!(ids(&search(&jobs(), term)), vec!["1"], "term {term}");
        }
    }

    #[test]
    fn results_are_a_subset_of_the_input() {
        let all = jobs();
        for term in ["a", "o", "zzz", "@"] {
            let found = search(&all, term);
            assert!(found.iter().all(|record| all.contains(record)));
        }
    }

    #[test]
    fn blank_fields_never_match_a_non_empty_term() {
        let course = CourseApplication {
            id: DocumentId("c".to_string()),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            program: String::new(),
            experience: String::new(),
            start_date: String::new(),
            reason: String::new(),
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!matches(&course, "x"));
        assert!(matches(&course, ""));
    }
}
