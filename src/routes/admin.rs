use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router
///
/// Nested under `/admin`. Each handler requires `admin_dashboard` or
/// `user_management`, both of which only the admin role holds.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        .route("/stats", get(admin::get_admin_stats))
        // GET /admin/users
        .route("/users", get(admin::list_users))
        // PUT /admin/users/{id}/role
        // Promotes an unassigned registration (or re-assigns an existing user).
        .route("/users/{id}/role", put(admin::assign_role))
}
