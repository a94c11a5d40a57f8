use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod mock;
pub mod models;
pub mod repository;
pub mod storage;

// Routers split by access level (public, authenticated, admin).
pub mod routes;
use auth::Session;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document built from the `#[utoipa::path]` handlers and `ToSchema`
/// models, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::account::get_locales, handlers::account::register_user,
        handlers::account::get_me, handlers::account::get_dashboard,
        handlers::account::check_guard,
        handlers::documents::list_documents, handlers::documents::get_document,
        handlers::documents::create_document, handlers::documents::update_document,
        handlers::documents::delete_document, handlers::documents::get_upload_url,
        handlers::candidates::list_candidates, handlers::candidates::get_candidate_board,
        handlers::candidates::get_candidate, handlers::candidates::create_candidate,
        handlers::candidates::update_candidate, handlers::candidates::update_candidate_status,
        handlers::jobs::list_open_jobs, handlers::jobs::list_managed_jobs,
        handlers::jobs::create_job, handlers::jobs::update_job_status,
        handlers::evaluations::list_evaluations, handlers::evaluations::create_evaluation,
        handlers::communications::list_communications,
        handlers::communications::send_communication,
        handlers::admin::get_admin_stats, handlers::admin::list_users,
        handlers::admin::assign_role,
    ),
    components(
        schemas(
            models::Role, models::User, models::RegisterUserRequest, models::AssignRoleRequest,
            models::DocumentType, models::DocumentStatus, models::Document,
            models::CreateDocumentRequest, models::UpdateDocumentRequest,
            models::UploadUrlRequest, models::UploadUrlResponse,
            models::ApplicationStatus, models::CptOptStatus, models::Candidate,
            models::CreateCandidateRequest, models::UpdateCandidateRequest,
            models::CandidateStatusRequest, models::JobStatus, models::JobOpening,
            models::CreateJobRequest, models::JobStatusRequest, models::Recommendation,
            models::Evaluation, models::CreateEvaluationRequest, models::Communication,
            models::CreateCommunicationRequest, models::StatusCount,
            models::AdminDashboardStats, models::LocaleSettings,
            access::Section, access::NavItem, access::Dashboard, access::GuardResponse,
            filter::BoardColumn,
        )
    ),
    tags(
        (name = "living-stones", description = "Living Stones volunteer management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into every
/// request. Handlers pull the parts they need through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, chosen at startup.
    pub repo: RepositoryState,
    /// S3/MinIO presigned uploads, or the mock in tests.
    pub storage: StorageState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_layer
///
/// Runs the `Session` extractor ahead of the protected routers. A request without
/// a usable session is answered with the 401 redirect to `/login` and never
/// reaches a handler. The resolved session is stored in the request extensions,
/// where the handler's own `Session` extractor picks it up without a second
/// repository lookup.
async fn session_layer(session: Session, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_layer,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_layer,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Every request gets an x-request-id, echoed back on the response.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the request id, so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
