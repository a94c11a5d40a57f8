use crate::{
    AppState,
    handlers::{account, jobs},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router
///
/// Health probe, locale settings, registration, the guard check and the careers
/// listing. None of these sit behind the session layer.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe.
        .route("/health", get(|| async { "ok" }))
        // GET /locales
        .route("/locales", get(account::get_locales))
        // POST /register
        // Signup at the identity provider, mirrored locally as an unassigned user.
        .route("/register", post(account::register_user))
        // GET /guard/{section}
        // Reads the session itself, so callers without one get the login redirect.
        .route("/guard/{section}", get(account::check_guard))
        // GET /jobs?team=...&search=...
        // Open postings only.
        .route("/jobs", get(jobs::list_open_jobs))
}
