//! Mock data generation.
//!
//! Fake but well-shaped records for demo stores and tests. A fixed seed always
//! reproduces the same records, ids included.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use uuid::Uuid;

use crate::{
    models::{
        ApplicationStatus, Candidate, Communication, CptOptStatus, Document, DocumentStatus,
        DocumentType, Evaluation, JobOpening, JobStatus, Recommendation, Role, User,
    },
    repository::{RepoError, Repository, SeedData},
};

/// Upper bound on a single generation request.
pub const MAX_MOCK_COUNT: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("requested {requested} records, the limit is {MAX_MOCK_COUNT}")]
    TooMany { requested: usize },

    #[error("cannot generate {what} without {needs}")]
    MissingDependency {
        what: &'static str,
        needs: &'static str,
    },

    #[error("failed to store generated records: {0}")]
    Store(#[from] RepoError),
}

const FIRST_NAMES: &[&str] = &[
    "Ana", "Ben", "Chloe", "Daniel", "Elena", "Farah", "Gabriel", "Hana", "Isaac", "Jade",
    "Kofi", "Lucia", "Mateo", "Nadia", "Omar", "Priya", "Quinn", "Rosa", "Samuel", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Adeyemi", "Brooks", "Castillo", "Dubois", "Evans", "Fischer", "Garcia", "Haddad", "Ito",
    "Johnson", "Kim", "Lopez", "Mensah", "Nguyen", "Okafor", "Patel", "Rossi", "Silva",
];

const TEAMS: &[&str] = &[
    "Youth Ministry",
    "Food Pantry",
    "Media",
    "Tutoring",
    "Outreach",
    "Facilities",
];

const POSITIONS: &[&str] = &[
    "Volunteer Coordinator",
    "Tutor",
    "Event Assistant",
    "Social Media Volunteer",
    "Pantry Organizer",
    "Mentor",
    "Grant Writer",
];

const LOCATIONS: &[&str] = &["On-site", "Remote", "Hybrid"];

const DOCUMENT_TITLES: &[&str] = &[
    "Code of Conduct",
    "Volunteer Handbook",
    "Safety Training",
    "Orientation Checklist",
    "Volunteer Agreement",
    "Spring Project Plan",
    "Quarterly Report",
    "Interview Scorecard",
];

const SUBJECTS: &[&str] = &[
    "Welcome aboard",
    "Schedule update",
    "Training reminder",
    "Monthly newsletter",
    "Team meeting",
];

/// MockGenerator
///
/// Wraps a seeded `StdRng`. Without a seed, the generator is seeded from entropy.
pub struct MockGenerator {
    rng: StdRng,
    epoch: DateTime<Utc>,
}

impl MockGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // Dates are offsets from a fixed instant so seeded output does not drift
        // with the wall clock.
        let epoch = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self { rng, epoch }
    }

    fn check(count: usize) -> Result<(), MockError> {
        if count > MAX_MOCK_COUNT {
            Err(MockError::TooMany { requested: count })
        } else {
            Ok(())
        }
    }

    fn id(&mut self) -> Uuid {
        Uuid::from_u128(self.rng.r#gen())
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        // Every table passed in is a non-empty const.
        items[self.rng.gen_range(0..items.len())]
    }

    fn date(&mut self) -> DateTime<Utc> {
        self.epoch + Duration::minutes(self.rng.gen_range(0..365 * 24 * 60))
    }

    fn person(&mut self) -> (String, String) {
        let first = self.pick(FIRST_NAMES);
        let last = self.pick(LAST_NAMES);
        let n: u16 = self.rng.gen_range(1..1000);
        let email = format!(
            "{}.{}{}@example.org",
            first.to_lowercase(),
            last.to_lowercase(),
            n
        );
        (format!("{first} {last}"), email)
    }

    /// Users spread over every role. The first six cover each role once.
    pub fn users(&mut self, count: usize) -> Result<Vec<User>, MockError> {
        Self::check(count)?;
        Ok((0..count)
            .map(|i| {
                let (full_name, email) = self.person();
                let role = Role::ALL
                    .get(i)
                    .copied()
                    .unwrap_or_else(|| self.pick(Role::ALL));
                let team = match role {
                    Role::Lead | Role::LeadProject | Role::Volunteer => {
                        Some(self.pick(TEAMS).to_string())
                    }
                    _ => None,
                };
                User {
                    id: self.id(),
                    email,
                    full_name,
                    role,
                    team,
                    created_at: self.date(),
                }
            })
            .collect())
    }

    pub fn documents(&mut self, count: usize, uploaders: &[Uuid]) -> Result<Vec<Document>, MockError> {
        Self::check(count)?;
        if count > 0 && uploaders.is_empty() {
            return Err(MockError::MissingDependency {
                what: "documents",
                needs: "uploaders",
            });
        }
        Ok((0..count)
            .map(|_| {
                let doc_type = self.pick(DocumentType::ALL);
                let upload_date = self.date();
                let edits: i32 = self.rng.gen_range(0..5);
                let title = self.pick(DOCUMENT_TITLES);
                let year = 2023 + self.rng.gen_range(0..3i32);
                let id = self.id();
                Document {
                    id,
                    name: format!("{title} {year}"),
                    doc_type,
                    status: self.pick(DocumentStatus::ALL),
                    upload_date,
                    last_modified_date: upload_date + Duration::days(edits as i64 * 3),
                    version: 1 + edits,
                    uploaded_by: self.pick(uploaders),
                    storage_key: Some(format!("documents/{id}.pdf")),
                }
            })
            .collect())
    }

    pub fn candidates(&mut self, count: usize) -> Result<Vec<Candidate>, MockError> {
        Self::check(count)?;
        Ok((0..count)
            .map(|_| {
                let (name, email) = self.person();
                let status = self.pick(ApplicationStatus::ALL);
                let created_at = self.date();
                let hr_interview_date = (status >= ApplicationStatus::HrInterview)
                    .then(|| created_at + Duration::days(self.rng.gen_range(3..10)));
                let pm_interview_date = (status >= ApplicationStatus::PmInterview)
                    .then(|| created_at + Duration::days(self.rng.gen_range(10..20)));
                let notes = if self.rng.gen_bool(0.5) {
                    format!("Available {} hours per week.", self.rng.gen_range(2..20u32))
                } else {
                    String::new()
                };
                Candidate {
                    id: self.id(),
                    name,
                    email,
                    applied_role: self.pick(POSITIONS).to_string(),
                    team: self.pick(TEAMS).to_string(),
                    application_status: status,
                    cpt_opt_status: self.pick(CptOptStatus::ALL),
                    hr_interview_date,
                    pm_interview_date,
                    notes,
                    version: 1,
                    created_at,
                }
            })
            .collect())
    }

    pub fn job_openings(&mut self, count: usize) -> Result<Vec<JobOpening>, MockError> {
        Self::check(count)?;
        Ok((0..count)
            .map(|_| {
                let title = self.pick(POSITIONS);
                let team = self.pick(TEAMS);
                JobOpening {
                    id: self.id(),
                    title: title.to_string(),
                    team: team.to_string(),
                    description: format!("Join the {team} team as a {title}."),
                    location: self.pick(LOCATIONS).to_string(),
                    hours_per_week: self.rng.gen_range(2..=20),
                    status: self.pick(JobStatus::ALL),
                    posted_at: self.date(),
                }
            })
            .collect())
    }

    pub fn evaluations(
        &mut self,
        count: usize,
        candidates: &[Uuid],
        evaluators: &[Uuid],
    ) -> Result<Vec<Evaluation>, MockError> {
        Self::check(count)?;
        if count > 0 && (candidates.is_empty() || evaluators.is_empty()) {
            return Err(MockError::MissingDependency {
                what: "evaluations",
                needs: "candidates and evaluators",
            });
        }
        Ok((0..count)
            .map(|_| {
                let score: i32 = self.rng.gen_range(1..=5);
                let recommendation = match score {
                    5 => Recommendation::StrongYes,
                    4 => Recommendation::Yes,
                    3 | 2 => Recommendation::No,
                    _ => Recommendation::StrongNo,
                };
                Evaluation {
                    id: self.id(),
                    candidate_id: self.pick(candidates),
                    evaluator_id: self.pick(evaluators),
                    score,
                    recommendation,
                    comments: format!("Scored {score}/5 in the interview."),
                    created_at: self.date(),
                }
            })
            .collect())
    }

    pub fn communications(
        &mut self,
        count: usize,
        senders: &[Uuid],
    ) -> Result<Vec<Communication>, MockError> {
        Self::check(count)?;
        if count > 0 && senders.is_empty() {
            return Err(MockError::MissingDependency {
                what: "communications",
                needs: "senders",
            });
        }
        Ok((0..count)
            .map(|_| {
                let size = self.rng.gen_range(1..=3);
                let mut audience: Vec<Role> = Role::ALL
                    .choose_multiple(&mut self.rng, size)
                    .copied()
                    .collect();
                audience.sort();
                let subject = self.pick(SUBJECTS);
                Communication {
                    id: self.id(),
                    sender_id: self.pick(senders),
                    subject: subject.to_string(),
                    body: format!("{subject}: details inside."),
                    audience,
                    sent_at: self.date(),
                }
            })
            .collect())
    }

    /// A consistent data set: every reference points at a generated record.
    pub fn seed_data(&mut self, plan: &SeedPlan) -> Result<SeedData, MockError> {
        let users = self.users(plan.users)?;
        let staff: Vec<Uuid> = users
            .iter()
            .filter(|u| matches!(u.role, Role::Admin | Role::Hr))
            .map(|u| u.id)
            .collect();
        let evaluators: Vec<Uuid> = users
            .iter()
            .filter(|u| {
                matches!(
                    u.role,
                    Role::Admin | Role::Hr | Role::Lead | Role::LeadProject
                )
            })
            .map(|u| u.id)
            .collect();

        let documents = self.documents(plan.documents, &staff)?;
        let candidates = self.candidates(plan.candidates)?;
        let jobs = self.job_openings(plan.jobs)?;
        let candidate_ids: Vec<Uuid> = candidates.iter().map(|c| c.id).collect();
        let evaluations = self.evaluations(plan.evaluations, &candidate_ids, &evaluators)?;
        let communications = self.communications(plan.communications, &evaluators)?;

        Ok(SeedData {
            users,
            documents,
            candidates,
            jobs,
            evaluations,
            communications,
        })
    }
}

/// SeedPlan
///
/// How many records of each kind `seed_repository` creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub users: usize,
    pub documents: usize,
    pub candidates: usize,
    pub jobs: usize,
    pub evaluations: usize,
    pub communications: usize,
}

impl SeedPlan {
    /// Scales every collection from one base count. At least six users are
    /// generated so each role exists.
    pub fn uniform(count: usize) -> Self {
        Self {
            users: count.max(Role::ALL.len()),
            documents: count,
            candidates: count,
            jobs: count.div_ceil(2),
            evaluations: count,
            communications: count.div_ceil(2),
        }
    }
}

/// Generates a data set and writes it through the repository.
pub async fn seed_repository(
    repo: &dyn Repository,
    plan: &SeedPlan,
    seed: Option<u64>,
) -> Result<SeedData, MockError> {
    let data = MockGenerator::new(seed).seed_data(plan)?;
    repo.seed(data.clone()).await?;
    tracing::info!(
        users = data.users.len(),
        documents = data.documents.len(),
        candidates = data.candidates.len(),
        jobs = data.jobs.len(),
        "seeded repository with mock data"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let a = MockGenerator::new(Some(42)).candidates(20).unwrap();
        let b = MockGenerator::new(Some(42)).candidates(20).unwrap();
        assert_eq!(a, b);
        let c = MockGenerator::new(Some(43)).candidates(20).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn first_users_cover_every_role() {
        let users = MockGenerator::new(Some(1)).users(6).unwrap();
        let roles: Vec<Role> = users.iter().map(|u| u.role).collect();
        assert_eq!(roles, Role::ALL.to_vec());
    }

    #[test]
    fn over_limit_is_an_error() {
        let err = MockGenerator::new(Some(1))
            .documents(MAX_MOCK_COUNT + 1, &[Uuid::nil()])
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn documents_need_uploaders() {
        let err = MockGenerator::new(Some(1)).documents(3, &[]).unwrap_err();
        assert!(matches!(err, MockError::MissingDependency { .. }));
        assert!(MockGenerator::new(Some(1)).documents(0, &[]).unwrap().is_empty());
    }

    #[test]
    fn interview_dates_follow_stage() {
        for c in MockGenerator::new(Some(9)).candidates(200).unwrap() {
            assert_eq!(
                c.hr_interview_date.is_some(),
                c.application_status >= ApplicationStatus::HrInterview
            );
        }
    }

    #[test]
    fn seed_data_references_are_consistent() {
        let data = MockGenerator::new(Some(5))
            .seed_data(&SeedPlan::uniform(12))
            .unwrap();
        let user_ids: Vec<Uuid> = data.users.iter().map(|u| u.id).collect();
        let candidate_ids: Vec<Uuid> = data.candidates.iter().map(|c| c.id).collect();
        assert!(data.documents.iter().all(|d| user_ids.contains(&d.uploaded_by)));
        assert!(data
            .evaluations
            .iter()
            .all(|e| candidate_ids.contains(&e.candidate_id) && user_ids.contains(&e.evaluator_id)));
        assert!(data.communications.iter().all(|c| !c.audience.is_empty()));
    }
}
