use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    access::Section,
    auth::Session,
    error::ApiError,
    filter::{JobQuery, filter_job_openings},
    handlers::validated,
    models::{CreateJobRequest, JobOpening, JobStatus, JobStatusRequest},
};

/// list_open_jobs
///
/// [Public Route] The careers page. Only `open` postings are listed, whatever
/// status the query asks for.
#[utoipa::path(
    get,
    path = "/jobs",
    params(JobQuery),
    responses((status = 200, description = "Open positions", body = [JobOpening]))
)]
pub async fn list_open_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Vec<JobOpening>>, ApiError> {
    let jobs = state.repo.list_jobs().await?;
    let query = JobQuery {
        status: Some(JobStatus::Open),
        ..query
    };
    Ok(Json(filter_job_openings(&jobs, &query)))
}

/// list_managed_jobs
///
/// [Authenticated Route] Every posting, drafts and closed ones included.
#[utoipa::path(
    get,
    path = "/jobs/manage",
    params(JobQuery),
    responses((status = 200, description = "All postings", body = [JobOpening]))
)]
pub async fn list_managed_jobs(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Vec<JobOpening>>, ApiError> {
    session.require(Section::JobOpeningsManage)?;
    let jobs = state.repo.list_jobs().await?;
    Ok(Json(filter_job_openings(&jobs, &query)))
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Created", body = JobOpening),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_job(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobOpening>), ApiError> {
    session.require(Section::JobOpeningsManage)?;
    validated(payload.validate())?;
    let job = state.repo.create_job(payload).await?;
    tracing::info!(job_id = %job.id, status = %job.status, "job opening created");
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}/status",
    params(("id" = Uuid, Path, description = "Job opening ID")),
    request_body = JobStatusRequest,
    responses(
        (status = 200, description = "Updated", body = JobOpening),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_job_status(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobStatusRequest>,
) -> Result<Json<JobOpening>, ApiError> {
    session.require(Section::JobOpeningsManage)?;
    Ok(Json(state.repo.set_job_status(id, payload.status).await?))
}
