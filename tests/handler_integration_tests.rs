use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use living_stones::{
    AppState, InMemoryRepository,
    access::Section,
    auth::Session,
    config::AppConfig,
    error::ApiError,
    filter::{CandidateQuery, DocumentQuery, JobQuery},
    handlers::{account, admin, candidates, communications, documents, evaluations, jobs},
    models::{
        ApplicationStatus, AssignRoleRequest, CandidateStatusRequest, CreateCandidateRequest,
        CreateCommunicationRequest, CreateDocumentRequest, CreateEvaluationRequest,
        CreateJobRequest, CptOptStatus, DocumentStatus, DocumentType, JobStatus, JobStatusRequest,
        Recommendation, RegisterUserRequest, Role, UpdateCandidateRequest, UpdateDocumentRequest,
        UploadUrlRequest, User,
    },
    repository::Repository,
    storage::MockStorageService,
};
use std::sync::Arc;
use uuid::Uuid;

// --- Fixtures ---

struct Fixture {
    state: AppState,
    repo: Arc<InMemoryRepository>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_storage(MockStorageService::new())
    }

    fn with_storage(storage: MockStorageService) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let state = AppState {
            repo: repo.clone(),
            storage: Arc::new(storage),
            config: AppConfig::default(),
        };
        Self { state, repo }
    }

    /// Stores a user with `role` and returns the session the extractor would build.
    async fn session(&self, role: Role) -> Session {
        let user = self
            .repo
            .create_user(User {
                id: Uuid::new_v4(),
                email: format!("{}@livingstones.org", role.as_str()),
                full_name: format!("Test {role}"),
                role,
                team: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        Session {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }
    }

    fn state(&self) -> State<AppState> {
        State(self.state.clone())
    }
}

fn candidate_request(name: &str, team: &str) -> CreateCandidateRequest {
    CreateCandidateRequest {
        name: name.to_string(),
        email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
        applied_role: "Volunteer Coordinator".to_string(),
        team: team.to_string(),
        cpt_opt_status: CptOptStatus::NotApplicable,
        notes: String::new(),
    }
}

fn job_request(title: &str, status: JobStatus) -> CreateJobRequest {
    CreateJobRequest {
        title: title.to_string(),
        team: "Outreach".to_string(),
        description: "Help run weekend food drives.".to_string(),
        location: "Remote".to_string(),
        hours_per_week: 10,
        status,
    }
}

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::Unauthorized) => {}
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

// --- Session & navigation ---

#[tokio::test]
async fn test_dashboard_lands_each_role_on_its_home() {
    let fx = Fixture::new();
    for (role, home) in [
        (Role::Admin, Section::AdminDashboard),
        (Role::Hr, Section::HrDashboard),
        (Role::Lead, Section::LeadDashboard),
        (Role::Volunteer, Section::VolunteerDashboard),
        (Role::Unassigned, Section::Onboarding),
    ] {
        let Json(dashboard) = account::get_dashboard(fx.session(role).await).await;
        assert_eq!(dashboard.home, home);
        assert!(!dashboard.navigation.is_empty());
    }
}

#[tokio::test]
async fn test_guard_authorizes_allowed_role_and_rejects_others() {
    let fx = Fixture::new();

    let Json(ok) =
        account::check_guard(Some(fx.session(Role::Hr).await), Path(Section::HrDashboard))
            .await
            .unwrap();
    assert_eq!(ok.state, "authorized");
    assert_eq!(ok.section, Section::HrDashboard);

    assert_unauthorized(
        account::check_guard(
            Some(fx.session(Role::Volunteer).await),
            Path(Section::HrDashboard),
        )
        .await,
    );
}

#[tokio::test]
async fn test_guard_without_session_is_unauthorized() {
    assert_unauthorized(account::check_guard(None, Path(Section::Communications)).await);
}

#[tokio::test]
async fn test_rejection_renders_login_redirect() {
    let response = ApiError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["location"], "/login");
}

#[tokio::test]
async fn test_me_returns_current_record() {
    let fx = Fixture::new();
    let session = fx.session(Role::Lead).await;
    let id = session.user_id;

    let Json(me) = account::get_me(session, fx.state()).await.unwrap();
    assert_eq!(me.id, id);
    assert_eq!(me.role, Role::Lead);
}

#[tokio::test]
async fn test_locales_come_from_config() {
    let fx = Fixture::new();
    let Json(locales) = account::get_locales(fx.state()).await;
    assert_eq!(locales.locales, vec!["en", "es"]);
    assert_eq!(locales.default_locale, "en");
}

#[tokio::test]
async fn test_local_registration_creates_unassigned_user() {
    let fx = Fixture::new();
    let (status, Json(user)) = account::register_user(
        fx.state(),
        Json(RegisterUserRequest {
            email: "new.volunteer@example.org".to_string(),
            password: "correct horse".to_string(),
            full_name: "New Volunteer".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user.role, Role::Unassigned);
    assert!(fx.repo.get_user(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_registration_rejects_short_password() {
    let fx = Fixture::new();
    let result = account::register_user(
        fx.state(),
        Json(RegisterUserRequest {
            email: "new.volunteer@example.org".to_string(),
            password: "short".to_string(),
            full_name: "New Volunteer".to_string(),
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

// --- Documents ---

#[tokio::test]
async fn test_documents_are_scoped_to_role_types() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;

    for (name, doc_type) in [
        ("Code of Conduct", DocumentType::Policy),
        ("Volunteer Agreement", DocumentType::Contract),
        ("Q3 Report", DocumentType::Report),
    ] {
        documents::create_document(
            hr.clone(),
            fx.state(),
            Json(CreateDocumentRequest {
                name: name.to_string(),
                doc_type,
                storage_key: None,
            }),
        )
        .await
        .unwrap();
    }

    let Json(all) = documents::list_documents(hr, fx.state(), Query(DocumentQuery::default()))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let volunteer = fx.session(Role::Volunteer).await;
    let Json(visible) =
        documents::list_documents(volunteer.clone(), fx.state(), Query(DocumentQuery::default()))
            .await
            .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].doc_type, DocumentType::Policy);

    // A document outside the role's types is reported as missing.
    let contract = all
        .iter()
        .find(|d| d.doc_type == DocumentType::Contract)
        .unwrap();
    let result = documents::get_document(volunteer, fx.state(), Path(contract.id)).await;
    assert!(matches!(result, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn test_document_search_and_status_filters() {
    let fx = Fixture::new();
    let admin = fx.session(Role::Admin).await;

    for (name, doc_type) in [
        ("Safeguarding Policy", DocumentType::Policy),
        ("Travel Policy", DocumentType::Policy),
        ("Kitchen Handbook", DocumentType::Handbook),
    ] {
        documents::create_document(
            admin.clone(),
            fx.state(),
            Json(CreateDocumentRequest {
                name: name.to_string(),
                doc_type,
                storage_key: None,
            }),
        )
        .await
        .unwrap();
    }

    let query = DocumentQuery {
        search: Some("POLICY".to_string()),
        status: Some(DocumentStatus::Draft),
        ..DocumentQuery::default()
    };
    let Json(found) = documents::list_documents(admin, fx.state(), Query(query))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|d| d.name.contains("Policy")));
}

#[tokio::test]
async fn test_volunteer_cannot_create_documents() {
    let fx = Fixture::new();
    let result = documents::create_document(
        fx.session(Role::Volunteer).await,
        fx.state(),
        Json(CreateDocumentRequest {
            name: "Sneaky".to_string(),
            doc_type: DocumentType::Policy,
            storage_key: None,
        }),
    )
    .await;
    assert_unauthorized(result);
}

#[tokio::test]
async fn test_document_update_checks_version() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;
    let (_, Json(doc)) = documents::create_document(
        hr.clone(),
        fx.state(),
        Json(CreateDocumentRequest {
            name: "Onboarding Checklist".to_string(),
            doc_type: DocumentType::Onboarding,
            storage_key: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(doc.version, 1);

    let Json(updated) = documents::update_document(
        hr.clone(),
        fx.state(),
        Path(doc.id),
        Json(UpdateDocumentRequest {
            expected_version: 1,
            status: Some(DocumentStatus::PendingReview),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.status, DocumentStatus::PendingReview);

    let stale = documents::update_document(
        hr,
        fx.state(),
        Path(doc.id),
        Json(UpdateDocumentRequest {
            expected_version: 1,
            name: Some("Renamed".to_string()),
            ..Default::default()
        }),
    )
    .await;
    assert!(matches!(
        stale,
        Err(ApiError::Conflict {
            expected: 1,
            actual: 2
        })
    ));
}

#[tokio::test]
async fn test_delete_document_then_not_found() {
    let fx = Fixture::new();
    let admin = fx.session(Role::Admin).await;
    let (_, Json(doc)) = documents::create_document(
        admin.clone(),
        fx.state(),
        Json(CreateDocumentRequest {
            name: "Old Handbook".to_string(),
            doc_type: DocumentType::Handbook,
            storage_key: None,
        }),
    )
    .await
    .unwrap();

    let status = documents::delete_document(admin.clone(), fx.state(), Path(doc.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let again = documents::delete_document(admin, fx.state(), Path(doc.id)).await;
    assert!(matches!(again, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn test_upload_url_uses_documents_prefix() {
    let fx = Fixture::new();
    let Json(response) = documents::get_upload_url(
        fx.session(Role::Hr).await,
        fx.state(),
        Json(UploadUrlRequest {
            filename: "handbook.pdf".to_string(),
            file_type: "application/pdf".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(response.resource_key.starts_with("documents/"));
    assert!(response.resource_key.ends_with(".pdf"));
    assert!(response.upload_url.contains(&response.resource_key));
}

#[tokio::test]
async fn test_upload_url_rejects_unlisted_type() {
    let fx = Fixture::new();
    let result = documents::get_upload_url(
        fx.session(Role::Admin).await,
        fx.state(),
        Json(UploadUrlRequest {
            filename: "movie.mp4".to_string(),
            file_type: "video/mp4".to_string(),
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_upload_url_storage_failure_is_internal() {
    let fx = Fixture::with_storage(MockStorageService::new_failing());
    let result = documents::get_upload_url(
        fx.session(Role::Admin).await,
        fx.state(),
        Json(UploadUrlRequest {
            filename: "handbook.pdf".to_string(),
            file_type: "application/pdf".to_string(),
        }),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::Storage(_)));
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- Candidates & evaluations ---

#[tokio::test]
async fn test_candidate_pipeline_flow() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;

    let (status, Json(candidate)) = candidates::create_candidate(
        hr.clone(),
        fx.state(),
        Json(candidate_request("Ana Torres", "Youth")),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(candidate.application_status, ApplicationStatus::Applied);

    let Json(moved) = candidates::update_candidate_status(
        hr.clone(),
        fx.state(),
        Path(candidate.id),
        Json(CandidateStatusRequest {
            expected_version: candidate.version,
            status: ApplicationStatus::HrInterview,
        }),
    )
    .await
    .unwrap();
    assert_eq!(moved.application_status, ApplicationStatus::HrInterview);
    assert_eq!(moved.version, candidate.version + 1);

    let Json(board) = candidates::get_candidate_board(
        hr.clone(),
        fx.state(),
        Query(CandidateQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(board.len(), ApplicationStatus::ALL.len());
    let column = board
        .iter()
        .find(|c| c.status == ApplicationStatus::HrInterview)
        .unwrap();
    assert_eq!(column.candidates.len(), 1);

    let stale = candidates::update_candidate(
        hr,
        fx.state(),
        Path(candidate.id),
        Json(UpdateCandidateRequest {
            expected_version: candidate.version,
            notes: Some("late note".to_string()),
            ..Default::default()
        }),
    )
    .await;
    assert!(matches!(stale, Err(ApiError::Conflict { .. })));
}

#[tokio::test]
async fn test_leads_read_candidates_but_cannot_move_them() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;
    let (_, Json(candidate)) =
        candidates::create_candidate(hr, fx.state(), Json(candidate_request("Ben Ode", "Media")))
            .await
            .unwrap();

    let lead = fx.session(Role::Lead).await;
    let Json(found) = candidates::get_candidate(lead.clone(), fx.state(), Path(candidate.id))
        .await
        .unwrap();
    assert_eq!(found.id, candidate.id);

    let result = candidates::update_candidate_status(
        lead,
        fx.state(),
        Path(candidate.id),
        Json(CandidateStatusRequest {
            expected_version: 1,
            status: ApplicationStatus::Rejected,
        }),
    )
    .await;
    assert_unauthorized(result);

    assert_unauthorized(
        candidates::list_candidates(
            fx.session(Role::Volunteer).await,
            fx.state(),
            Query(CandidateQuery::default()),
        )
        .await,
    );
}

#[tokio::test]
async fn test_candidate_filter_by_team() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;
    for (name, team) in [("Cara Lin", "Youth"), ("Dev Rao", "Media"), ("Eli Park", "Youth")] {
        candidates::create_candidate(hr.clone(), fx.state(), Json(candidate_request(name, team)))
            .await
            .unwrap();
    }

    let query = CandidateQuery {
        team: Some("youth".to_string()),
        ..CandidateQuery::default()
    };
    let Json(youth) = candidates::list_candidates(hr, fx.state(), Query(query))
        .await
        .unwrap();
    assert_eq!(youth.len(), 2);
    assert!(youth.iter().all(|c| c.team == "Youth"));
}

#[tokio::test]
async fn test_evaluations_for_candidate() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;
    let (_, Json(candidate)) = candidates::create_candidate(
        hr.clone(),
        fx.state(),
        Json(candidate_request("Fay Quinn", "Youth")),
    )
    .await
    .unwrap();

    let lead = fx.session(Role::LeadProject).await;
    let (_, Json(evaluation)) = evaluations::create_evaluation(
        lead.clone(),
        fx.state(),
        Path(candidate.id),
        Json(CreateEvaluationRequest {
            score: 4,
            recommendation: Recommendation::Yes,
            comments: "Great with kids".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(evaluation.evaluator_id, lead.user_id);

    let Json(list) = evaluations::list_evaluations(hr, fx.state(), Path(candidate.id))
        .await
        .unwrap();
    assert_eq!(list.len(), 1);

    let out_of_range = evaluations::create_evaluation(
        lead.clone(),
        fx.state(),
        Path(candidate.id),
        Json(CreateEvaluationRequest {
            score: 9,
            recommendation: Recommendation::StrongYes,
            comments: String::new(),
        }),
    )
    .await;
    assert!(matches!(out_of_range, Err(ApiError::Validation(_))));

    let missing = evaluations::list_evaluations(lead, fx.state(), Path(Uuid::new_v4())).await;
    assert!(matches!(missing, Err(ApiError::NotFound)));
}

// --- Jobs ---

#[tokio::test]
async fn test_public_jobs_only_lists_open_postings() {
    let fx = Fixture::new();
    let hr = fx.session(Role::Hr).await;
    for (title, status) in [
        ("Tutor", JobStatus::Open),
        ("Driver", JobStatus::Draft),
        ("Cook", JobStatus::Closed),
    ] {
        jobs::create_job(hr.clone(), fx.state(), Json(job_request(title, status)))
            .await
            .unwrap();
    }

    // Asking for drafts on the public listing still yields only open postings.
    let query = JobQuery {
        status: Some(JobStatus::Draft),
        ..JobQuery::default()
    };
    let Json(public) = jobs::list_open_jobs(fx.state(), Query(query)).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].title, "Tutor");

    let Json(all) = jobs::list_managed_jobs(hr.clone(), fx.state(), Query(JobQuery::default()))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let driver = all.iter().find(|j| j.title == "Driver").unwrap();
    let Json(opened) = jobs::update_job_status(
        hr,
        fx.state(),
        Path(driver.id),
        Json(JobStatusRequest {
            status: JobStatus::Open,
        }),
    )
    .await
    .unwrap();
    assert_eq!(opened.status, JobStatus::Open);
}

#[tokio::test]
async fn test_job_hours_are_validated() {
    let fx = Fixture::new();
    let mut request = job_request("Night Shift", JobStatus::Open);
    request.hours_per_week = 0;
    let result = jobs::create_job(fx.session(Role::Admin).await, fx.state(), Json(request)).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

// --- Communications ---

#[tokio::test]
async fn test_communications_follow_audience() {
    let fx = Fixture::new();
    let lead = fx.session(Role::Lead).await;
    communications::send_communication(
        lead.clone(),
        fx.state(),
        Json(CreateCommunicationRequest {
            subject: "Saturday shift".to_string(),
            body: "Meet at the hall at 9.".to_string(),
            audience: vec![Role::Volunteer],
        }),
    )
    .await
    .unwrap();

    let Json(for_volunteer) =
        communications::list_communications(fx.session(Role::Volunteer).await, fx.state())
            .await
            .unwrap();
    assert_eq!(for_volunteer.len(), 1);

    let Json(for_unassigned) =
        communications::list_communications(fx.session(Role::Unassigned).await, fx.state())
            .await
            .unwrap();
    assert!(for_unassigned.is_empty());

    let Json(for_admin) =
        communications::list_communications(fx.session(Role::Admin).await, fx.state())
            .await
            .unwrap();
    assert_eq!(for_admin.len(), 1);

    let from_volunteer = communications::send_communication(
        fx.session(Role::Volunteer).await,
        fx.state(),
        Json(CreateCommunicationRequest {
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            audience: vec![Role::Admin],
        }),
    )
    .await;
    assert_unauthorized(from_volunteer);
}

// --- Admin ---

#[tokio::test]
async fn test_admin_assigns_role_and_sees_stats() {
    let fx = Fixture::new();
    let admin_session = fx.session(Role::Admin).await;
    let newcomer = fx.session(Role::Unassigned).await;

    let Json(stats) = admin::get_admin_stats(admin_session.clone(), fx.state())
        .await
        .unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.unassigned_users, 1);

    let Json(user) = admin::assign_role(
        admin_session.clone(),
        fx.state(),
        Path(newcomer.user_id),
        Json(AssignRoleRequest {
            role: Role::Volunteer,
            team: Some("  Outreach ".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(user.role, Role::Volunteer);
    assert_eq!(user.team.as_deref(), Some("Outreach"));

    let Json(users) = admin::list_users(admin_session, fx.state()).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_non_admin_cannot_reach_admin_handlers() {
    let fx = Fixture::new();
    for role in [Role::Hr, Role::Lead, Role::Volunteer, Role::Unassigned] {
        assert_unauthorized(admin::get_admin_stats(fx.session(role).await, fx.state()).await);
        assert_unauthorized(admin::list_users(fx.session(role).await, fx.state()).await);
    }
}

#[tokio::test]
async fn test_assign_role_to_unknown_user_is_not_found() {
    let fx = Fixture::new();
    let result = admin::assign_role(
        fx.session(Role::Admin).await,
        fx.state(),
        Path(Uuid::new_v4()),
        Json(AssignRoleRequest {
            role: Role::Hr,
            team: None,
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::NotFound)));
}
