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
    filter::{BoardColumn, CandidateQuery, filter_candidates, group_by_status},
    handlers::validated,
    models::{Candidate, CandidateStatusRequest, CreateCandidateRequest, UpdateCandidateRequest},
};

/// list_candidates
///
/// [Authenticated Route] Candidates narrowed by stage, team and search term.
#[utoipa::path(
    get,
    path = "/candidates",
    params(CandidateQuery),
    responses((status = 200, description = "Candidates", body = [Candidate]))
)]
pub async fn list_candidates(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    session.require(Section::Candidates)?;
    let candidates = state.repo.list_candidates().await?;
    Ok(Json(filter_candidates(&candidates, &query)))
}

/// get_candidate_board
///
/// [Authenticated Route] The pipeline as kanban columns, one per stage in stage
/// order. Filters apply before grouping, so empty columns are still returned.
#[utoipa::path(
    get,
    path = "/candidates/board",
    params(CandidateQuery),
    responses((status = 200, description = "Pipeline board", body = [BoardColumn]))
)]
pub async fn get_candidate_board(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<BoardColumn>>, ApiError> {
    session.require(Section::Candidates)?;
    let candidates = state.repo.list_candidates().await?;
    Ok(Json(group_by_status(&filter_candidates(&candidates, &query))))
}

#[utoipa::path(
    get,
    path = "/candidates/{id}",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Found", body = Candidate),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_candidate(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, ApiError> {
    session.require(Section::Candidates)?;
    let candidate = state.repo.get_candidate(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/candidates",
    request_body = CreateCandidateRequest,
    responses(
        (status = 201, description = "Created", body = Candidate),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_candidate(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateCandidateRequest>,
) -> Result<(StatusCode, Json<Candidate>), ApiError> {
    session.require(Section::CandidatePipeline)?;
    validated(payload.validate())?;
    let candidate = state.repo.create_candidate(payload).await?;
    tracing::info!(candidate_id = %candidate.id, "candidate created");
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// update_candidate
///
/// [Authenticated Route] Edits profile fields and interview dates. Stage changes
/// go through `PUT /candidates/{id}/status`.
#[utoipa::path(
    put,
    path = "/candidates/{id}",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = UpdateCandidateRequest,
    responses(
        (status = 200, description = "Updated", body = Candidate),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Version conflict")
    )
)]
pub async fn update_candidate(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCandidateRequest>,
) -> Result<Json<Candidate>, ApiError> {
    session.require(Section::CandidatePipeline)?;
    validated(payload.validate())?;
    Ok(Json(state.repo.update_candidate(id, payload).await?))
}

/// update_candidate_status
///
/// [Authenticated Route] Moves a candidate to another pipeline stage.
#[utoipa::path(
    put,
    path = "/candidates/{id}/status",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = CandidateStatusRequest,
    responses(
        (status = 200, description = "Moved", body = Candidate),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Version conflict")
    )
)]
pub async fn update_candidate_status(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CandidateStatusRequest>,
) -> Result<Json<Candidate>, ApiError> {
    session.require(Section::CandidatePipeline)?;

    let current = state.repo.get_candidate(id).await?.ok_or(ApiError::NotFound)?;
    if !current.application_status.can_transition_to(payload.status) {
        return Err(ApiError::Validation(format!(
            "cannot move candidate from '{}' to '{}'",
            current.application_status, payload.status
        )));
    }

    let candidate = state
        .repo
        .set_candidate_status(id, payload.expected_version, payload.status)
        .await?;
    tracing::info!(
        candidate_id = %id,
        from = %current.application_status,
        to = %candidate.application_status,
        "candidate stage changed"
    );
    Ok(Json(candidate))
}
