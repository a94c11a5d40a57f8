use crate::{
    AppState,
    handlers::{account, candidates, communications, documents, evaluations, jobs},
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router
///
/// Everything a signed-in user of some role can reach. The session layer in
/// `create_router` rejects anonymous requests before they get here; the
/// per-section role check happens inside each handler via `Session::require`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session ---
        .route("/me", get(account::get_me))
        .route("/dashboard", get(account::get_dashboard))
        // --- Documents ---
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        // POST /documents/upload-url
        // Presigned PUT URL; the file never passes through this server.
        .route("/documents/upload-url", post(documents::get_upload_url))
        .route(
            "/documents/{id}",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        // --- Candidates ---
        .route(
            "/candidates",
            get(candidates::list_candidates).post(candidates::create_candidate),
        )
        .route("/candidates/board", get(candidates::get_candidate_board))
        .route(
            "/candidates/{id}",
            get(candidates::get_candidate).put(candidates::update_candidate),
        )
        .route(
            "/candidates/{id}/status",
            put(candidates::update_candidate_status),
        )
        .route(
            "/candidates/{id}/evaluations",
            get(evaluations::list_evaluations).post(evaluations::create_evaluation),
        )
        // --- Job openings ---
        .route("/jobs/manage", get(jobs::list_managed_jobs))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{id}/status", put(jobs::update_job_status))
        // --- Communications ---
        .route(
            "/communications",
            get(communications::list_communications).post(communications::send_communication),
        )
}
