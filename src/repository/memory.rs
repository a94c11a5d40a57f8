use async_trait::async_trait;
use chrono::Utc;
use std::{cmp::Reverse, collections::HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository, SeedData, status_breakdown};
use crate::models::{
    AdminDashboardStats, ApplicationStatus, Candidate, Communication, CreateCandidateRequest,
    CreateCommunicationRequest, CreateDocumentRequest, CreateEvaluationRequest, CreateJobRequest,
    Document, DocumentStatus, Evaluation, JobOpening, JobStatus, Role, UpdateCandidateRequest,
    UpdateDocumentRequest, User,
};

#[derive(Default)]
struct Store {
    users: Vec<User>,
    documents: Vec<Document>,
    candidates: Vec<Candidate>,
    jobs: Vec<JobOpening>,
    evaluations: Vec<Evaluation>,
    communications: Vec<Communication>,
}

/// InMemoryRepository
///
/// A process-local store behind a `tokio::sync::RwLock`. Used in local mode when
/// no `DATABASE_URL` is configured, and by the test suites.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Appends the records whose id is not stored yet. Existing rows are left as they are.
fn insert_missing<T>(stored: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> Uuid) {
    let mut seen: HashSet<Uuid> = stored.iter().map(&id).collect();
    stored.extend(incoming.into_iter().filter(|item| seen.insert(id(item))));
}

fn check_version(expected: i32, actual: i32) -> RepoResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RepoError::VersionConflict { expected, actual })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: User) -> RepoResult<User> {
        let mut store = self.store.write().await;
        match store.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                existing.email = user.email;
                existing.full_name = user.full_name;
                Ok(existing.clone())
            }
            None => {
                store.users.push(user.clone());
                Ok(user)
            }
        }
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let store = self.store.read().await;
        let mut users = store.users.clone();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn set_user_role(&self, id: Uuid, role: Role, team: Option<String>) -> RepoResult<User> {
        let mut store = self.store.write().await;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        user.role = role;
        if team.is_some() {
            user.team = team;
        }
        Ok(user.clone())
    }

    async fn list_documents(&self) -> RepoResult<Vec<Document>> {
        let store = self.store.read().await;
        let mut docs = store.documents.clone();
        docs.sort_by_key(|d| (Reverse(d.upload_date), d.id));
        Ok(docs)
    }

    async fn get_document(&self, id: Uuid) -> RepoResult<Option<Document>> {
        let store = self.store.read().await;
        Ok(store.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn create_document(
        &self,
        req: CreateDocumentRequest,
        uploaded_by: Uuid,
    ) -> RepoResult<Document> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            doc_type: req.doc_type,
            status: DocumentStatus::Draft,
            upload_date: now,
            last_modified_date: now,
            version: 1,
            uploaded_by,
            storage_key: req.storage_key,
        };
        self.store.write().await.documents.push(doc.clone());
        Ok(doc)
    }

    async fn update_document(&self, id: Uuid, req: UpdateDocumentRequest) -> RepoResult<Document> {
        let mut store = self.store.write().await;
        let doc = store
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(RepoError::NotFound)?;
        check_version(req.expected_version, doc.version)?;

        if let Some(status) = req.status {
            if !doc.status.can_transition_to(status) {
                return Err(RepoError::Invalid(format!(
                    "document cannot move from {} to {}",
                    doc.status, status
                )));
            }
            doc.status = status;
        }
        if let Some(name) = req.name {
            doc.name = name.trim().to_string();
        }
        if let Some(key) = req.storage_key {
            doc.storage_key = Some(key);
        }
        doc.version += 1;
        doc.last_modified_date = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let before = store.documents.len();
        store.documents.retain(|d| d.id != id);
        Ok(store.documents.len() != before)
    }

    async fn list_candidates(&self) -> RepoResult<Vec<Candidate>> {
        let store = self.store.read().await;
        let mut candidates = store.candidates.clone();
        candidates.sort_by_key(|c| (Reverse(c.created_at), c.id));
        Ok(candidates)
    }

    async fn get_candidate(&self, id: Uuid) -> RepoResult<Option<Candidate>> {
        let store = self.store.read().await;
        Ok(store.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn create_candidate(&self, req: CreateCandidateRequest) -> RepoResult<Candidate> {
        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            applied_role: req.applied_role.trim().to_string(),
            team: req.team.trim().to_string(),
            application_status: ApplicationStatus::Applied,
            cpt_opt_status: req.cpt_opt_status,
            hr_interview_date: None,
            pm_interview_date: None,
            notes: req.notes,
            version: 1,
            created_at: Utc::now(),
        };
        self.store.write().await.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn update_candidate(
        &self,
        id: Uuid,
        req: UpdateCandidateRequest,
    ) -> RepoResult<Candidate> {
        let mut store = self.store.write().await;
        let candidate = store
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        check_version(req.expected_version, candidate.version)?;

        if let Some(role) = req.applied_role {
            candidate.applied_role = role.trim().to_string();
        }
        if let Some(team) = req.team {
            candidate.team = team.trim().to_string();
        }
        if let Some(status) = req.cpt_opt_status {
            candidate.cpt_opt_status = status;
        }
        if req.hr_interview_date.is_some() {
            candidate.hr_interview_date = req.hr_interview_date;
        }
        if req.pm_interview_date.is_some() {
            candidate.pm_interview_date = req.pm_interview_date;
        }
        if let Some(notes) = req.notes {
            candidate.notes = notes;
        }
        candidate.version += 1;
        Ok(candidate.clone())
    }

    async fn set_candidate_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: ApplicationStatus,
    ) -> RepoResult<Candidate> {
        let mut store = self.store.write().await;
        let candidate = store
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        check_version(expected_version, candidate.version)?;
        if !candidate.application_status.can_transition_to(status) {
            return Err(RepoError::Invalid(format!(
                "candidate cannot move from {} to {}",
                candidate.application_status, status
            )));
        }
        candidate.application_status = status;
        candidate.version += 1;
        Ok(candidate.clone())
    }

    async fn list_jobs(&self) -> RepoResult<Vec<JobOpening>> {
        let store = self.store.read().await;
        let mut jobs = store.jobs.clone();
        jobs.sort_by_key(|j| (Reverse(j.posted_at), j.id));
        Ok(jobs)
    }

    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobOpening> {
        let job = JobOpening {
            id: Uuid::new_v4(),
            title: req.title.trim().to_string(),
            team: req.team.trim().to_string(),
            description: req.description,
            location: req.location.trim().to_string(),
            hours_per_week: req.hours_per_week,
            status: req.status,
            posted_at: Utc::now(),
        };
        self.store.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> RepoResult<JobOpening> {
        let mut store = self.store.write().await;
        let job = store
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(RepoError::NotFound)?;
        job.status = status;
        Ok(job.clone())
    }

    async fn list_evaluations(&self, candidate_id: Uuid) -> RepoResult<Vec<Evaluation>> {
        let store = self.store.read().await;
        let mut evaluations: Vec<Evaluation> = store
            .evaluations
            .iter()
            .filter(|e| e.candidate_id == candidate_id)
            .cloned()
            .collect();
        evaluations.sort_by_key(|e| (e.created_at, e.id));
        Ok(evaluations)
    }

    async fn create_evaluation(
        &self,
        candidate_id: Uuid,
        evaluator_id: Uuid,
        req: CreateEvaluationRequest,
    ) -> RepoResult<Evaluation> {
        let mut store = self.store.write().await;
        if !store.candidates.iter().any(|c| c.id == candidate_id) {
            return Err(RepoError::NotFound);
        }
        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            candidate_id,
            evaluator_id,
            score: req.score,
            recommendation: req.recommendation,
            comments: req.comments,
            created_at: Utc::now(),
        };
        store.evaluations.push(evaluation.clone());
        Ok(evaluation)
    }

    async fn list_communications(&self) -> RepoResult<Vec<Communication>> {
        let store = self.store.read().await;
        let mut items = store.communications.clone();
        items.sort_by_key(|c| (Reverse(c.sent_at), c.id));
        Ok(items)
    }

    async fn create_communication(
        &self,
        sender_id: Uuid,
        req: CreateCommunicationRequest,
    ) -> RepoResult<Communication> {
        let mut audience = req.audience;
        audience.sort();
        audience.dedup();
        let item = Communication {
            id: Uuid::new_v4(),
            sender_id,
            subject: req.subject.trim().to_string(),
            body: req.body,
            audience,
            sent_at: Utc::now(),
        };
        self.store.write().await.communications.push(item.clone());
        Ok(item)
    }

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let store = self.store.read().await;
        Ok(AdminDashboardStats {
            total_users: store.users.len() as i64,
            unassigned_users: store
                .users
                .iter()
                .filter(|u| u.role == Role::Unassigned)
                .count() as i64,
            total_candidates: store.candidates.len() as i64,
            total_documents: store.documents.len() as i64,
            pending_documents: store
                .documents
                .iter()
                .filter(|d| d.status == DocumentStatus::PendingReview)
                .count() as i64,
            open_jobs: store
                .jobs
                .iter()
                .filter(|j| j.status == JobStatus::Open)
                .count() as i64,
            candidates_by_status: status_breakdown(
                store.candidates.iter().map(|c| (c.application_status, 1)),
            ),
        })
    }

    async fn seed(&self, data: SeedData) -> RepoResult<()> {
        let mut store = self.store.write().await;
        insert_missing(&mut store.users, data.users, |u| u.id);
        insert_missing(&mut store.documents, data.documents, |d| d.id);
        insert_missing(&mut store.candidates, data.candidates, |c| c.id);
        insert_missing(&mut store.jobs, data.jobs, |j| j.id);
        insert_missing(&mut store.evaluations, data.evaluations, |e| e.id);
        insert_missing(&mut store.communications, data.communications, |c| c.id);
        Ok(())
    }
}
