use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    access::Section,
    auth::Session,
    error::ApiError,
    filter::visible_communications,
    handlers::validated,
    models::{Communication, CreateCommunicationRequest},
};

/// list_communications
///
/// [Authenticated Route] Announcements addressed to the caller's role, newest first.
#[utoipa::path(
    get,
    path = "/communications",
    responses((status = 200, description = "Announcements", body = [Communication]))
)]
pub async fn list_communications(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Communication>>, ApiError> {
    session.require(Section::Communications)?;
    let items = state.repo.list_communications().await?;
    Ok(Json(visible_communications(&items, session.role)))
}

#[utoipa::path(
    post,
    path = "/communications",
    request_body = CreateCommunicationRequest,
    responses(
        (status = 201, description = "Sent", body = Communication),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn send_communication(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommunicationRequest>,
) -> Result<(StatusCode, Json<Communication>), ApiError> {
    session.require(Section::CommunicationsSend)?;
    validated(payload.validate())?;
    let sent = state
        .repo
        .create_communication(session.user_id, payload)
        .await?;
    tracing::info!(communication_id = %sent.id, audience = ?sent.audience, "announcement sent");
    Ok((StatusCode::CREATED, Json(sent)))
}
