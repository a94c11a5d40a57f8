use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    access::Section,
    auth::Session,
    error::ApiError,
    models::{AdminDashboardStats, AssignRoleRequest, User},
};

/// get_admin_stats
///
/// [Admin Route] Headline counts for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, ApiError> {
    session.require(Section::AdminDashboard)?;
    Ok(Json(state.repo.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    session.require(Section::UserManagement)?;
    Ok(Json(state.repo.list_users().await?))
}

/// assign_role
///
/// [Admin Route] Sets a user's role and team. This is how a fresh `unassigned`
/// registration gets access to anything beyond onboarding.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn assign_role(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<Json<User>, ApiError> {
    session.require(Section::UserManagement)?;
    let team = payload
        .team
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let user = state.repo.set_user_role(id, payload.role, team).await?;
    tracing::info!(user_id = %id, role = %user.role, by = %session.user_id, "role assigned");
    Ok(Json(user))
}
