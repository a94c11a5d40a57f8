use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::Role,
    repository::RepositoryState,
};

/// Claims
///
/// The payload expected inside a bearer JWT. The role is deliberately absent:
/// it is read from the repository on every request so a role change takes
/// effect without waiting for the token to expire.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at (seconds since the epoch).
    pub iat: usize,
}

/// Session
///
/// The resolved identity of an authenticated request. Handlers receive it as an
/// extractor argument and pass it to `access::authorize` with their section.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Signs an HS256 token for `user_id` valid for `ttl_secs`.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry, returning the token's subject.
pub fn verify_token(secret: &str, token: &str) -> Option<Uuid> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Expiry is exact; the default minute of leeway would keep dead sessions alive.
    validation.leeway = 0;

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(kind = ?other, "rejected malformed token"),
            }
            None
        }
    }
}

/// Resolves the request's user id: the local `x-user-id` bypass first (local env
/// only), then the bearer token.
fn resolve_user_id(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    if config.env == Env::Local {
        let bypass = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|id| Uuid::parse_str(id).ok());
        if bypass.is_some() {
            return bypass;
        }
    }

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    verify_token(&config.jwt_secret, token)
}

/// Session Extractor
///
/// 1. Reuses a session the session layer already resolved for this request.
/// 2. Otherwise resolves a user id (local bypass header or bearer JWT).
/// 3. Loads the user to get the current role; a deleted user has no session.
///
/// A missing or unreadable identity rejects with `ApiError::Unauthorized`
/// (401 + redirect to `/login`). A failed lookup is a 500.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let user_id = resolve_user_id(parts, &config).ok_or(ApiError::Unauthorized)?;

        let user = match repo.get_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::error!(error = %e, %user_id, "session lookup failed");
                return Err(ApiError::Internal(e.to_string()));
            }
        };

        Ok(Session {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}

/// Lets handlers take `Option<Session>` and run the guard themselves. Only an
/// absent identity becomes `None`; lookup failures still reject.
impl<S> OptionalFromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Session as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(session) => Ok(Some(session)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
