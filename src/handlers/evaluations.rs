use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    access::Section,
    auth::Session,
    error::ApiError,
    handlers::validated,
    models::{CreateEvaluationRequest, Evaluation},
};

/// list_evaluations
///
/// [Authenticated Route] Interview evaluations for one candidate, oldest first.
/// An unknown candidate is a 404 rather than an empty list.
#[utoipa::path(
    get,
    path = "/candidates/{id}/evaluations",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Evaluations", body = [Evaluation]),
        (status = 404, description = "Candidate not found")
    )
)]
pub async fn list_evaluations(
    session: Session,
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<Evaluation>>, ApiError> {
    session.require(Section::Evaluations)?;
    if state.repo.get_candidate(candidate_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(state.repo.list_evaluations(candidate_id).await?))
}

/// create_evaluation
///
/// [Authenticated Route] Records the caller's evaluation of a candidate.
#[utoipa::path(
    post,
    path = "/candidates/{id}/evaluations",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = CreateEvaluationRequest,
    responses(
        (status = 201, description = "Recorded", body = Evaluation),
        (status = 400, description = "Score out of range"),
        (status = 404, description = "Candidate not found")
    )
)]
pub async fn create_evaluation(
    session: Session,
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(payload): Json<CreateEvaluationRequest>,
) -> Result<(StatusCode, Json<Evaluation>), ApiError> {
    session.require(Section::Evaluations)?;
    validated(payload.validate())?;
    let evaluation = state
        .repo
        .create_evaluation(candidate_id, session.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}
