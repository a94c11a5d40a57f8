use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository, SeedData, status_breakdown};
use crate::models::{
    AdminDashboardStats, ApplicationStatus, Candidate, Communication, CreateCandidateRequest,
    CreateCommunicationRequest, CreateDocumentRequest, CreateEvaluationRequest, CreateJobRequest,
    Document, Evaluation, JobOpening, JobStatus, Role, UnknownVariant, UpdateCandidateRequest,
    UpdateDocumentRequest, User,
};

macro_rules! user_cols {
    () => {
        "id, email, full_name, role, team, created_at"
    };
}
macro_rules! doc_cols {
    () => {
        "id, name, doc_type, status, upload_date, last_modified_date, version, uploaded_by, storage_key"
    };
}
macro_rules! candidate_cols {
    () => {
        "id, name, email, applied_role, team, application_status, cpt_opt_status, \
         hr_interview_date, pm_interview_date, notes, version, created_at"
    };
}
macro_rules! job_cols {
    () => {
        "id, title, team, description, location, hours_per_week, status, posted_at"
    };
}
macro_rules! evaluation_cols {
    () => {
        "id, candidate_id, evaluator_id, score, recommendation, comments, created_at"
    };
}
macro_rules! communication_cols {
    () => {
        "id, sender_id, subject, body, audience, sent_at"
    };
}

// --- Row types ---
// Enum columns are stored as TEXT and parsed on the way out.

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    role: String,
    team: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownVariant;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role.parse()?,
            team: row.team,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    name: String,
    doc_type: String,
    status: String,
    upload_date: DateTime<Utc>,
    last_modified_date: DateTime<Utc>,
    version: i32,
    uploaded_by: Uuid,
    storage_key: Option<String>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = UnknownVariant;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            name: row.name,
            doc_type: row.doc_type.parse()?,
            status: row.status.parse()?,
            upload_date: row.upload_date,
            last_modified_date: row.last_modified_date,
            version: row.version,
            uploaded_by: row.uploaded_by,
            storage_key: row.storage_key,
        })
    }
}

#[derive(FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    email: String,
    applied_role: String,
    team: String,
    application_status: String,
    cpt_opt_status: String,
    hr_interview_date: Option<DateTime<Utc>>,
    pm_interview_date: Option<DateTime<Utc>>,
    notes: String,
    version: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = UnknownVariant;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(Candidate {
            id: row.id,
            name: row.name,
            email: row.email,
            applied_role: row.applied_role,
            team: row.team,
            application_status: row.application_status.parse()?,
            cpt_opt_status: row.cpt_opt_status.parse()?,
            hr_interview_date: row.hr_interview_date,
            pm_interview_date: row.pm_interview_date,
            notes: row.notes,
            version: row.version,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    team: String,
    description: String,
    location: String,
    hours_per_week: i32,
    status: String,
    posted_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobOpening {
    type Error = UnknownVariant;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(JobOpening {
            id: row.id,
            title: row.title,
            team: row.team,
            description: row.description,
            location: row.location,
            hours_per_week: row.hours_per_week,
            status: row.status.parse()?,
            posted_at: row.posted_at,
        })
    }
}

#[derive(FromRow)]
struct EvaluationRow {
    id: Uuid,
    candidate_id: Uuid,
    evaluator_id: Uuid,
    score: i32,
    recommendation: String,
    comments: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EvaluationRow> for Evaluation {
    type Error = UnknownVariant;

    fn try_from(row: EvaluationRow) -> Result<Self, Self::Error> {
        Ok(Evaluation {
            id: row.id,
            candidate_id: row.candidate_id,
            evaluator_id: row.evaluator_id,
            score: row.score,
            recommendation: row.recommendation.parse()?,
            comments: row.comments,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CommunicationRow {
    id: Uuid,
    sender_id: Uuid,
    subject: String,
    body: String,
    audience: Vec<String>,
    sent_at: DateTime<Utc>,
}

impl TryFrom<CommunicationRow> for Communication {
    type Error = UnknownVariant;

    fn try_from(row: CommunicationRow) -> Result<Self, Self::Error> {
        Ok(Communication {
            id: row.id,
            sender_id: row.sender_id,
            subject: row.subject,
            body: row.body,
            audience: row
                .audience
                .iter()
                .map(|r| r.parse())
                .collect::<Result<_, _>>()?,
            sent_at: row.sent_at,
        })
    }
}

fn convert<R, T>(rows: Vec<R>) -> RepoResult<Vec<T>>
where
    T: TryFrom<R, Error = UnknownVariant>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(RepoError::from))
        .collect()
}

fn check_version(expected: i32, actual: i32) -> RepoResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RepoError::VersionConflict { expected, actual })
    }
}

/// PostgresRepository
///
/// The production implementation of `Repository`. Versioned updates lock the row
/// (`SELECT ... FOR UPDATE`) inside a transaction, check the expected version,
/// then write.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn lock_document(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> RepoResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(concat!(
            "SELECT ",
            doc_cols!(),
            " FROM documents WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepoError::NotFound)?;
        Ok(Document::try_from(row)?)
    }

    async fn lock_candidate(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> RepoResult<Candidate> {
        let row = sqlx::query_as::<_, CandidateRow>(concat!(
            "SELECT ",
            candidate_cols!(),
            " FROM candidates WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepoError::NotFound)?;
        Ok(Candidate::try_from(row)?)
    }

    async fn count(&self, sql: &'static str) -> RepoResult<i64> {
        let (n,): (i64,) = sqlx::query_as(sql).fetch_one(&self.pool).await?;
        Ok(n)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_cols!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn create_user(&self, user: User) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, email, full_name, role, team, created_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6) ",
            "ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, full_name = EXCLUDED.full_name ",
            "RETURNING ",
            user_cols!()
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(&user.team)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(User::try_from(row)?)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_cols!(),
            " FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn set_user_role(&self, id: Uuid, role: Role, team: Option<String>) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "UPDATE users SET role = $2, team = COALESCE($3, team) WHERE id = $1 RETURNING ",
            user_cols!()
        ))
        .bind(id)
        .bind(role.as_str())
        .bind(team)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)?;
        Ok(User::try_from(row)?)
    }

    async fn list_documents(&self) -> RepoResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(concat!(
            "SELECT ",
            doc_cols!(),
            " FROM documents ORDER BY upload_date DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn get_document(&self, id: Uuid) -> RepoResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(concat!(
            "SELECT ",
            doc_cols!(),
            " FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::try_from).transpose()?)
    }

    async fn create_document(
        &self,
        req: CreateDocumentRequest,
        uploaded_by: Uuid,
    ) -> RepoResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(concat!(
            "INSERT INTO documents (id, name, doc_type, status, version, uploaded_by, storage_key) ",
            "VALUES ($1, $2, $3, 'draft', 1, $4, $5) RETURNING ",
            doc_cols!()
        ))
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.doc_type.as_str())
        .bind(uploaded_by)
        .bind(req.storage_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(Document::try_from(row)?)
    }

    async fn update_document(&self, id: Uuid, req: UpdateDocumentRequest) -> RepoResult<Document> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_document(&mut tx, id).await?;
        check_version(req.expected_version, current.version)?;
        if let Some(status) = req.status {
            if !current.status.can_transition_to(status) {
                return Err(RepoError::Invalid(format!(
                    "document cannot move from {} to {}",
                    current.status, status
                )));
            }
        }

        let row = sqlx::query_as::<_, DocumentRow>(concat!(
            "UPDATE documents SET name = COALESCE($2, name), status = COALESCE($3, status), ",
            "storage_key = COALESCE($4, storage_key), version = version + 1, ",
            "last_modified_date = now() WHERE id = $1 RETURNING ",
            doc_cols!()
        ))
        .bind(id)
        .bind(req.name.map(|n| n.trim().to_string()))
        .bind(req.status.map(|s| s.as_str()))
        .bind(req.storage_key)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Document::try_from(row)?)
    }

    async fn delete_document(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_candidates(&self) -> RepoResult<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(concat!(
            "SELECT ",
            candidate_cols!(),
            " FROM candidates ORDER BY created_at DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn get_candidate(&self, id: Uuid) -> RepoResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(concat!(
            "SELECT ",
            candidate_cols!(),
            " FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Candidate::try_from).transpose()?)
    }

    async fn create_candidate(&self, req: CreateCandidateRequest) -> RepoResult<Candidate> {
        let row = sqlx::query_as::<_, CandidateRow>(concat!(
            "INSERT INTO candidates (id, name, email, applied_role, team, application_status, ",
            "cpt_opt_status, notes, version) VALUES ($1, $2, $3, $4, $5, 'applied', $6, $7, 1) ",
            "RETURNING ",
            candidate_cols!()
        ))
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(req.applied_role.trim())
        .bind(req.team.trim())
        .bind(req.cpt_opt_status.as_str())
        .bind(&req.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(Candidate::try_from(row)?)
    }

    async fn update_candidate(
        &self,
        id: Uuid,
        req: UpdateCandidateRequest,
    ) -> RepoResult<Candidate> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_candidate(&mut tx, id).await?;
        check_version(req.expected_version, current.version)?;

        let row = sqlx::query_as::<_, CandidateRow>(concat!(
            "UPDATE candidates SET applied_role = COALESCE($2, applied_role), ",
            "team = COALESCE($3, team), cpt_opt_status = COALESCE($4, cpt_opt_status), ",
            "hr_interview_date = COALESCE($5, hr_interview_date), ",
            "pm_interview_date = COALESCE($6, pm_interview_date), ",
            "notes = COALESCE($7, notes), version = version + 1 WHERE id = $1 RETURNING ",
            candidate_cols!()
        ))
        .bind(id)
        .bind(req.applied_role.map(|r| r.trim().to_string()))
        .bind(req.team.map(|t| t.trim().to_string()))
        .bind(req.cpt_opt_status.map(|s| s.as_str()))
        .bind(req.hr_interview_date)
        .bind(req.pm_interview_date)
        .bind(req.notes)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Candidate::try_from(row)?)
    }

    async fn set_candidate_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: ApplicationStatus,
    ) -> RepoResult<Candidate> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_candidate(&mut tx, id).await?;
        check_version(expected_version, current.version)?;
        if !current.application_status.can_transition_to(status) {
            return Err(RepoError::Invalid(format!(
                "candidate cannot move from {} to {}",
                current.application_status, status
            )));
        }

        let row = sqlx::query_as::<_, CandidateRow>(concat!(
            "UPDATE candidates SET application_status = $2, version = version + 1 ",
            "WHERE id = $1 RETURNING ",
            candidate_cols!()
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Candidate::try_from(row)?)
    }

    async fn list_jobs(&self) -> RepoResult<Vec<JobOpening>> {
        let rows = sqlx::query_as::<_, JobRow>(concat!(
            "SELECT ",
            job_cols!(),
            " FROM job_openings ORDER BY posted_at DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobOpening> {
        let row = sqlx::query_as::<_, JobRow>(concat!(
            "INSERT INTO job_openings (id, title, team, description, location, hours_per_week, status) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            job_cols!()
        ))
        .bind(Uuid::new_v4())
        .bind(req.title.trim())
        .bind(req.team.trim())
        .bind(&req.description)
        .bind(req.location.trim())
        .bind(req.hours_per_week)
        .bind(req.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(JobOpening::try_from(row)?)
    }

    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> RepoResult<JobOpening> {
        let row = sqlx::query_as::<_, JobRow>(concat!(
            "UPDATE job_openings SET status = $2 WHERE id = $1 RETURNING ",
            job_cols!()
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)?;
        Ok(JobOpening::try_from(row)?)
    }

    async fn list_evaluations(&self, candidate_id: Uuid) -> RepoResult<Vec<Evaluation>> {
        let rows = sqlx::query_as::<_, EvaluationRow>(concat!(
            "SELECT ",
            evaluation_cols!(),
            " FROM evaluations WHERE candidate_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn create_evaluation(
        &self,
        candidate_id: Uuid,
        evaluator_id: Uuid,
        req: CreateEvaluationRequest,
    ) -> RepoResult<Evaluation> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM candidates WHERE id = $1")
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(RepoError::NotFound);
        }

        let row = sqlx::query_as::<_, EvaluationRow>(concat!(
            "INSERT INTO evaluations (id, candidate_id, evaluator_id, score, recommendation, comments) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            evaluation_cols!()
        ))
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(evaluator_id)
        .bind(req.score)
        .bind(req.recommendation.as_str())
        .bind(&req.comments)
        .fetch_one(&self.pool)
        .await?;
        Ok(Evaluation::try_from(row)?)
    }

    async fn list_communications(&self) -> RepoResult<Vec<Communication>> {
        let rows = sqlx::query_as::<_, CommunicationRow>(concat!(
            "SELECT ",
            communication_cols!(),
            " FROM communications ORDER BY sent_at DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn create_communication(
        &self,
        sender_id: Uuid,
        req: CreateCommunicationRequest,
    ) -> RepoResult<Communication> {
        let mut audience = req.audience;
        audience.sort();
        audience.dedup();
        let audience: Vec<String> = audience.iter().map(|r| r.as_str().to_string()).collect();

        let row = sqlx::query_as::<_, CommunicationRow>(concat!(
            "INSERT INTO communications (id, sender_id, subject, body, audience) ",
            "VALUES ($1, $2, $3, $4, $5) RETURNING ",
            communication_cols!()
        ))
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(req.subject.trim())
        .bind(&req.body)
        .bind(&audience)
        .fetch_one(&self.pool)
        .await?;
        Ok(Communication::try_from(row)?)
    }

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let by_status: Vec<(String, i64)> = sqlx::query_as(
            "SELECT application_status, COUNT(*) FROM candidates GROUP BY application_status",
        )
        .fetch_all(&self.pool)
        .await?;
        let by_status = by_status
            .into_iter()
            .map(|(status, n)| Ok((status.parse::<ApplicationStatus>()?, n)))
            .collect::<Result<Vec<_>, UnknownVariant>>()?;

        Ok(AdminDashboardStats {
            total_users: self.count("SELECT COUNT(*) FROM users").await?,
            unassigned_users: self
                .count("SELECT COUNT(*) FROM users WHERE role = 'unassigned'")
                .await?,
            total_candidates: self.count("SELECT COUNT(*) FROM candidates").await?,
            total_documents: self.count("SELECT COUNT(*) FROM documents").await?,
            pending_documents: self
                .count("SELECT COUNT(*) FROM documents WHERE status = 'pending_review'")
                .await?,
            open_jobs: self
                .count("SELECT COUNT(*) FROM job_openings WHERE status = 'open'")
                .await?,
            candidates_by_status: status_breakdown(by_status),
        })
    }

    async fn seed(&self, data: SeedData) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        for u in &data.users {
            sqlx::query(
                "INSERT INTO users (id, email, full_name, role, team, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
            )
            .bind(u.id)
            .bind(&u.email)
            .bind(&u.full_name)
            .bind(u.role.as_str())
            .bind(&u.team)
            .bind(u.created_at)
            .execute(&mut *tx)
            .await?;
        }
        for d in &data.documents {
            sqlx::query(concat!(
                "INSERT INTO documents (",
                doc_cols!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT (id) DO NOTHING"
            ))
            .bind(d.id)
            .bind(&d.name)
            .bind(d.doc_type.as_str())
            .bind(d.status.as_str())
            .bind(d.upload_date)
            .bind(d.last_modified_date)
            .bind(d.version)
            .bind(d.uploaded_by)
            .bind(&d.storage_key)
            .execute(&mut *tx)
            .await?;
        }
        for c in &data.candidates {
            sqlx::query(concat!(
                "INSERT INTO candidates (",
                candidate_cols!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) ",
                "ON CONFLICT (id) DO NOTHING"
            ))
            .bind(c.id)
            .bind(&c.name)
            .bind(&c.email)
            .bind(&c.applied_role)
            .bind(&c.team)
            .bind(c.application_status.as_str())
            .bind(c.cpt_opt_status.as_str())
            .bind(c.hr_interview_date)
            .bind(c.pm_interview_date)
            .bind(&c.notes)
            .bind(c.version)
            .bind(c.created_at)
            .execute(&mut *tx)
            .await?;
        }
        for j in &data.jobs {
            sqlx::query(concat!(
                "INSERT INTO job_openings (",
                job_cols!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (id) DO NOTHING"
            ))
            .bind(j.id)
            .bind(&j.title)
            .bind(&j.team)
            .bind(&j.description)
            .bind(&j.location)
            .bind(j.hours_per_week)
            .bind(j.status.as_str())
            .bind(j.posted_at)
            .execute(&mut *tx)
            .await?;
        }
        for e in &data.evaluations {
            sqlx::query(concat!(
                "INSERT INTO evaluations (",
                evaluation_cols!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (id) DO NOTHING"
            ))
            .bind(e.id)
            .bind(e.candidate_id)
            .bind(e.evaluator_id)
            .bind(e.score)
            .bind(e.recommendation.as_str())
            .bind(&e.comments)
            .bind(e.created_at)
            .execute(&mut *tx)
            .await?;
        }
        for c in &data.communications {
            let audience: Vec<String> = c.audience.iter().map(|r| r.as_str().to_string()).collect();
            sqlx::query(concat!(
                "INSERT INTO communications (",
                communication_cols!(),
                ") VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING"
            ))
            .bind(c.id)
            .bind(c.sender_id)
            .bind(&c.subject)
            .bind(&c.body)
            .bind(&audience)
            .bind(c.sent_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
