//! Resource filtering.
//!
//! Every function here is pure and keeps the relative order of its input, so a
//! repository that returns rows in a defined order gets that order back after
//! narrowing.

use serde::Deserialize;

use crate::models::{
    ApplicationStatus, Candidate, Communication, Document, DocumentStatus, DocumentType,
    JobOpening, JobStatus, Role,
};

/// Searchable
///
/// The text fields a free-text search term is matched against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Document {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.doc_type.as_str()]
    }
}

impl Searchable for Candidate {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.applied_role.as_str(),
            self.team.as_str(),
            self.notes.as_str(),
        ]
    }
}

impl Searchable for JobOpening {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.team.as_str(),
            self.description.as_str(),
            self.location.as_str(),
        ]
    }
}

impl Searchable for Communication {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject.as_str(), self.body.as_str()]
    }
}

/// Normalizes a raw search term. Blank terms become `None` (match everything).
fn normalize(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn matches_normalized<T: Searchable>(item: &T, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle)),
    }
}

/// A blank team (an empty select in the UI) does not narrow anything.
fn team_filter(team: Option<&str>) -> Option<&str> {
    team.map(str::trim).filter(|t| !t.is_empty())
}

/// Case-insensitive substring match over the item's search fields.
pub fn matches_search<T: Searchable>(item: &T, term: &str) -> bool {
    matches_normalized(item, normalize(Some(term)).as_deref())
}

pub fn filter_by_search<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    let needle = normalize(Some(term));
    items
        .iter()
        .filter(|item| matches_normalized(*item, needle.as_deref()))
        .cloned()
        .collect()
}

/// The document categories a role may see.
pub fn allowed_document_types(role: Role) -> &'static [DocumentType] {
    use DocumentType::*;
    match role {
        Role::Admin | Role::Hr => DocumentType::ALL,
        Role::Lead | Role::LeadProject => {
            &[Policy, Handbook, Training, ProjectPlan, Report, Evaluation]
        }
        Role::Volunteer => &[Policy, Handbook, Training, Onboarding],
        Role::Unassigned => &[Policy, Onboarding],
    }
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct DocumentQuery {
    #[serde(rename = "type")]
    #[param(value_type = Option<String>)]
    pub doc_type: Option<DocumentType>,
    #[param(value_type = Option<String>)]
    pub status: Option<DocumentStatus>,
    pub search: Option<String>,
}

/// Narrows documents to the allowed types, then by the optional query.
pub fn filter_documents(
    docs: &[Document],
    allowed_types: &[DocumentType],
    query: &DocumentQuery,
) -> Vec<Document> {
    let needle = normalize(query.search.as_deref());
    docs.iter()
        .filter(|d| allowed_types.contains(&d.doc_type))
        .filter(|d| query.doc_type.is_none_or(|t| d.doc_type == t))
        .filter(|d| query.status.is_none_or(|s| d.status == s))
        .filter(|d| matches_normalized(*d, needle.as_deref()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct CandidateQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<ApplicationStatus>,
    pub team: Option<String>,
    pub search: Option<String>,
}

pub fn filter_candidates(candidates: &[Candidate], query: &CandidateQuery) -> Vec<Candidate> {
    let needle = normalize(query.search.as_deref());
    let team = team_filter(query.team.as_deref());
    candidates
        .iter()
        .filter(|c| query.status.is_none_or(|s| c.application_status == s))
        .filter(|c| team.is_none_or(|team| c.team.eq_ignore_ascii_case(team)))
        .filter(|c| matches_normalized(*c, needle.as_deref()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct JobQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<JobStatus>,
    pub team: Option<String>,
    pub search: Option<String>,
}

pub fn filter_job_openings(jobs: &[JobOpening], query: &JobQuery) -> Vec<JobOpening> {
    let needle = normalize(query.search.as_deref());
    let team = team_filter(query.team.as_deref());
    jobs.iter()
        .filter(|j| query.status.is_none_or(|s| j.status == s))
        .filter(|j| team.is_none_or(|team| j.team.eq_ignore_ascii_case(team)))
        .filter(|j| matches_normalized(*j, needle.as_deref()))
        .cloned()
        .collect()
}

/// Communications addressed to `role`. Admins see everything.
pub fn visible_communications(items: &[Communication], role: Role) -> Vec<Communication> {
    items
        .iter()
        .filter(|c| role == Role::Admin || c.audience.contains(&role))
        .cloned()
        .collect()
}

/// BoardColumn
///
/// One column of the recruitment board.
#[derive(Debug, Clone, PartialEq, serde::Serialize, ts_rs::TS, utoipa::ToSchema)]
#[ts(export)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub candidates: Vec<Candidate>,
}

/// Groups candidates into one column per pipeline stage, in stage order. Empty
/// stages still get a column.
pub fn group_by_status(candidates: &[Candidate]) -> Vec<BoardColumn> {
    ApplicationStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            candidates: candidates
                .iter()
                .filter(|c| c.application_status == *status)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CptOptStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn doc(name: &str, doc_type: DocumentType, status: DocumentStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: name.to_string(),
            doc_type,
            status,
            upload_date: Utc::now(),
            last_modified_date: Utc::now(),
            version: 1,
            uploaded_by: Uuid::nil(),
            storage_key: None,
        }
    }

    fn candidate(name: &str, team: &str, status: ApplicationStatus) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@mail.org", name.to_lowercase()),
            applied_role: "Tutor".to_string(),
            team: team.to_string(),
            application_status: status,
            cpt_opt_status: CptOptStatus::NotApplicable,
            hr_interview_date: None,
            pm_interview_date: None,
            notes: String::new(),
            version: 1,
            created_at: Utc::now(),
        }
    }

    fn job(title: &str, team: &str) -> JobOpening {
        JobOpening {
            id: Uuid::new_v4(),
            title: title.to_string(),
            team: team.to_string(),
            description: String::new(),
            location: "Remote".to_string(),
            hours_per_week: 4,
            status: JobStatus::Open,
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let d = doc("Volunteer Handbook 2024", DocumentType::Handbook, DocumentStatus::Approved);
        assert!(matches_search(&d, "handBOOK"));
        assert!(matches_search(&d, "  2024 "));
        assert!(!matches_search(&d, "contract"));
    }

    #[test]
    fn blank_search_matches_everything() {
        let docs = vec![
            doc("A", DocumentType::Policy, DocumentStatus::Draft),
            doc("B", DocumentType::Report, DocumentStatus::Draft),
        ];
        assert_eq!(filter_by_search(&docs, "   "), docs);
        assert_eq!(filter_by_search(&docs, ""), docs);
    }

    #[test]
    fn documents_outside_allowed_types_are_dropped() {
        let docs = vec![
            doc("Code of Conduct", DocumentType::Policy, DocumentStatus::Approved),
            doc("Employment Contract", DocumentType::Contract, DocumentStatus::Approved),
            doc("Orientation", DocumentType::Onboarding, DocumentStatus::Approved),
        ];
        let out = filter_documents(
            &docs,
            allowed_document_types(Role::Volunteer),
            &DocumentQuery::default(),
        );
        let names: Vec<&str> = out.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Code of Conduct", "Orientation"]);
    }

    #[test]
    fn document_query_combines_type_status_and_search() {
        let docs = vec![
            doc("Q1 Report", DocumentType::Report, DocumentStatus::Approved),
            doc("Q2 Report", DocumentType::Report, DocumentStatus::Draft),
            doc("Q2 Plan", DocumentType::ProjectPlan, DocumentStatus::Draft),
        ];
        let query = DocumentQuery {
            doc_type: Some(DocumentType::Report),
            status: Some(DocumentStatus::Draft),
            search: Some("q2".to_string()),
        };
        let out = filter_documents(&docs, DocumentType::ALL, &query);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Q2 Report");
    }

    #[test]
    fn candidate_filter_keeps_input_order() {
        let cands = vec![
            candidate("Zoe", "Youth", ApplicationStatus::Screening),
            candidate("Adam", "Media", ApplicationStatus::Screening),
            candidate("Mia", "youth", ApplicationStatus::Applied),
            candidate("Ben", "Youth", ApplicationStatus::Screening),
        ];
        let query = CandidateQuery {
            status: Some(ApplicationStatus::Screening),
            team: Some("YOUTH".to_string()),
            search: None,
        };
        let names: Vec<String> = filter_candidates(&cands, &query)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Zoe", "Ben"]);
    }

    #[test]
    fn blank_team_does_not_narrow() {
        let cands = vec![
            candidate("Zoe", "Youth", ApplicationStatus::Applied),
            candidate("Adam", "Media", ApplicationStatus::Screening),
        ];
        for team in ["", "   "] {
            let query = CandidateQuery {
                status: None,
                team: Some(team.to_string()),
                search: Some(String::new()),
            };
            assert_eq!(filter_candidates(&cands, &query), cands);
        }

        let jobs = vec![job("Tutor", "Tutoring"), job("Editor", "Media")];
        let query = JobQuery {
            status: None,
            team: Some(" ".to_string()),
            search: None,
        };
        assert_eq!(filter_job_openings(&jobs, &query), jobs);

        let query = JobQuery {
            status: None,
            team: Some(" media ".to_string()),
            search: None,
        };
        let titles: Vec<String> = filter_job_openings(&jobs, &query)
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["Editor"]);
    }

    #[test]
    fn communications_follow_audience() {
        let note = Communication {
            id: Uuid::new_v4(),
            sender_id: Uuid::nil(),
            subject: "Leads sync".to_string(),
            body: "Thursday".to_string(),
            audience: vec![Role::Lead, Role::LeadProject],
            sent_at: Utc::now(),
        };
        let items = vec![note];
        assert_eq!(visible_communications(&items, Role::Lead).len(), 1);
        assert_eq!(visible_communications(&items, Role::Admin).len(), 1);
        assert!(visible_communications(&items, Role::Volunteer).is_empty());
    }

    #[test]
    fn board_has_a_column_per_stage() {
        let cands = vec![
            candidate("A", "T", ApplicationStatus::Accepted),
            candidate("B", "T", ApplicationStatus::Applied),
            candidate("C", "T", ApplicationStatus::Accepted),
        ];
        let board = group_by_status(&cands);
        assert_eq!(board.len(), ApplicationStatus::ALL.len());
        assert_eq!(board[0].status, ApplicationStatus::Applied);
        let accepted = board
            .iter()
            .find(|col| col.status == ApplicationStatus::Accepted)
            .unwrap();
        let names: Vec<&str> = accepted.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
