use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    AdminDashboardStats, ApplicationStatus, Candidate, Communication, CreateCandidateRequest,
    CreateCommunicationRequest, CreateDocumentRequest, CreateEvaluationRequest, CreateJobRequest,
    Document, Evaluation, JobOpening, JobStatus, Role, StatusCount, UnknownVariant,
    UpdateCandidateRequest, UpdateDocumentRequest, User,
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Failure of a persistence operation.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    /// Optimistic lock failure: the caller's `expected_version` is stale.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("{0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored enum column holds text no variant matches.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] UnknownVariant),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// SeedData
///
/// Complete records inserted as-is, ids and timestamps included. Produced by the
/// mock generator for demo and test stores.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub documents: Vec<Document>,
    pub candidates: Vec<Candidate>,
    pub jobs: Vec<JobOpening>,
    pub evaluations: Vec<Evaluation>,
    pub communications: Vec<Communication>,
}

/// Repository Trait
///
/// The persistence contract shared by the in-memory and Postgres backends.
///
/// Ordering is part of the contract: documents newest upload first, candidates
/// newest first, jobs newest posting first, evaluations oldest first,
/// communications newest first, users by creation. Ties break on id.
///
/// **Send + Sync + async_trait** let `Arc<dyn Repository>` cross Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    /// Inserts the user, or refreshes email and name if the id already exists.
    async fn create_user(&self, user: User) -> RepoResult<User>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn set_user_role(&self, id: Uuid, role: Role, team: Option<String>) -> RepoResult<User>;

    // --- Documents ---
    async fn list_documents(&self) -> RepoResult<Vec<Document>>;
    async fn get_document(&self, id: Uuid) -> RepoResult<Option<Document>>;
    async fn create_document(
        &self,
        req: CreateDocumentRequest,
        uploaded_by: Uuid,
    ) -> RepoResult<Document>;
    /// Applies the partial update if `req.expected_version` matches, bumping the version.
    async fn update_document(&self, id: Uuid, req: UpdateDocumentRequest) -> RepoResult<Document>;
    async fn delete_document(&self, id: Uuid) -> RepoResult<bool>;

    // --- Candidates ---
    async fn list_candidates(&self) -> RepoResult<Vec<Candidate>>;
    async fn get_candidate(&self, id: Uuid) -> RepoResult<Option<Candidate>>;
    async fn create_candidate(&self, req: CreateCandidateRequest) -> RepoResult<Candidate>;
    async fn update_candidate(
        &self,
        id: Uuid,
        req: UpdateCandidateRequest,
    ) -> RepoResult<Candidate>;
    async fn set_candidate_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: ApplicationStatus,
    ) -> RepoResult<Candidate>;

    // --- Job Openings ---
    async fn list_jobs(&self) -> RepoResult<Vec<JobOpening>>;
    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobOpening>;
    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> RepoResult<JobOpening>;

    // --- Evaluations ---
    async fn list_evaluations(&self, candidate_id: Uuid) -> RepoResult<Vec<Evaluation>>;
    /// Fails with `NotFound` when the candidate does not exist.
    async fn create_evaluation(
        &self,
        candidate_id: Uuid,
        evaluator_id: Uuid,
        req: CreateEvaluationRequest,
    ) -> RepoResult<Evaluation>;

    // --- Communications ---
    async fn list_communications(&self) -> RepoResult<Vec<Communication>>;
    async fn create_communication(
        &self,
        sender_id: Uuid,
        req: CreateCommunicationRequest,
    ) -> RepoResult<Communication>;

    // --- Admin ---
    async fn get_stats(&self) -> RepoResult<AdminDashboardStats>;
    async fn seed(&self, data: SeedData) -> RepoResult<()>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Expands per-status counts into one entry per pipeline stage, in stage order.
pub(crate) fn status_breakdown(
    counts: impl IntoIterator<Item = (ApplicationStatus, i64)>,
) -> Vec<StatusCount> {
    let counts: Vec<(ApplicationStatus, i64)> = counts.into_iter().collect();
    ApplicationStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: status.as_str().to_string(),
            count: counts
                .iter()
                .filter(|(s, _)| s == status)
                .map(|(_, n)| n)
                .sum(),
        })
        .collect()
}
