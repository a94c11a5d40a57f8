use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    access::{Dashboard, GuardResponse, Section, SessionGuard},
    auth::Session,
    config::Env,
    error::ApiError,
    handlers::validated,
    models::{LocaleSettings, RegisterUserRequest, Role, User},
};

/// Minimal shape of the identity provider's signup response: only the new user's id.
#[derive(Deserialize)]
struct SignupResponse {
    id: Uuid,
}

/// get_locales
///
/// [Public Route] The UI languages the portal ships and the one it falls back to.
#[utoipa::path(
    get,
    path = "/locales",
    responses((status = 200, description = "Supported locales", body = LocaleSettings))
)]
pub async fn get_locales(State(state): State<AppState>) -> Json<LocaleSettings> {
    Json(LocaleSettings {
        locales: state.config.locales.clone(),
        default_locale: state.config.default_locale.clone(),
    })
}

/// Asks the identity provider to create the account and returns its id.
async fn signup(
    auth_url: &str,
    api_key: &str,
    payload: &RegisterUserRequest,
) -> Result<Uuid, ApiError> {
    let url = format!("{}/auth/v1/signup", auth_url.trim_end_matches('/'));

    let response = reqwest::Client::new()
        .post(url)
        .header("apikey", api_key)
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let status = response.status();
    if status.is_client_error() {
        // Duplicate email, weak password and the like: the caller can fix these.
        return Err(ApiError::Validation(format!(
            "identity provider rejected the signup ({status})"
        )));
    }
    if !status.is_success() {
        return Err(ApiError::Upstream(format!("signup returned {status}")));
    }

    let body = response
        .json::<SignupResponse>()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(body.id)
}

/// register_user
///
/// [Public Route] Creates the account at the identity provider, then mirrors the
/// returned id into the repository as an `unassigned` user. An admin assigns the
/// real role later.
///
/// Locally, without `AUTH_URL`, a fresh id is minted so the flow can be exercised
/// offline.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Invalid input or rejected by the identity provider"),
        (status = 502, description = "Identity provider unavailable")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    validated(payload.validate())?;

    let id = match (&state.config.auth_url, &state.config.auth_api_key) {
        (Some(url), Some(key)) => signup(url, key, &payload).await?,
        _ if state.config.env == Env::Local => {
            tracing::warn!("AUTH_URL not configured; minting a local user id");
            Uuid::new_v4()
        }
        _ => return Err(ApiError::Internal("identity provider not configured".into())),
    };

    let user = state
        .repo
        .create_user(User {
            id,
            email: payload.email.trim().to_string(),
            full_name: payload.full_name.trim().to_string(),
            role: Role::Unassigned,
            team: None,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// get_me
///
/// [Authenticated Route] The caller's own user record, role included.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "No session")
    )
)]
pub async fn get_me(session: Session, State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(user))
}

/// get_dashboard
///
/// [Authenticated Route] The caller's landing section and the navigation entries
/// their role can open.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Landing section and navigation", body = Dashboard))
)]
pub async fn get_dashboard(session: Session) -> Json<Dashboard> {
    Json(Dashboard::for_role(session.role))
}

/// check_guard
///
/// [Public Route] Runs the session guard for one section so a layout can decide
/// whether to render. No session and a wrong role both get the 401 redirect to
/// `/login`.
#[utoipa::path(
    get,
    path = "/guard/{section}",
    params(("section" = Section, Path, description = "Section to check")),
    responses(
        (status = 200, description = "Authorized", body = GuardResponse),
        (status = 401, description = "Redirect to /login")
    )
)]
pub async fn check_guard(
    session: Option<Session>,
    Path(section): Path<Section>,
) -> Result<Json<GuardResponse>, ApiError> {
    let mut guard = SessionGuard::new(section);
    guard.resolve(session.as_ref());
    let session = guard.into_result()?;
    tracing::debug!(user_id = %session.user_id, %section, "guard passed");
    Ok(Json(GuardResponse {
        section,
        state: "authorized".to_string(),
    }))
}
