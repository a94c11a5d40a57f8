use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    auth::Session,
    error::ApiError,
    models::{Role, text_enum},
};

/// Where every rejected session is sent.
pub const LOGIN_PATH: &str = "/login";

/// Section
///
/// A gated area of the portal. Each section carries a fixed allowed-role set, and
/// every handler asks `authorize` for exactly one section before touching data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Section {
    AdminDashboard,
    HrDashboard,
    LeadDashboard,
    VolunteerDashboard,
    Onboarding,
    Candidates,
    CandidatePipeline,
    JobOpeningsManage,
    Documents,
    DocumentsManage,
    Evaluations,
    Communications,
    CommunicationsSend,
    UserManagement,
}

text_enum!(Section {
    AdminDashboard => "admin_dashboard",
    HrDashboard => "hr_dashboard",
    LeadDashboard => "lead_dashboard",
    VolunteerDashboard => "volunteer_dashboard",
    Onboarding => "onboarding",
    Candidates => "candidates",
    CandidatePipeline => "candidate_pipeline",
    JobOpeningsManage => "job_openings_manage",
    Documents => "documents",
    DocumentsManage => "documents_manage",
    Evaluations => "evaluations",
    Communications => "communications",
    CommunicationsSend => "communications_send",
    UserManagement => "user_management",
});

impl Section {
    pub fn allowed_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Section::AdminDashboard | Section::UserManagement => &[Admin],
            Section::HrDashboard
            | Section::CandidatePipeline
            | Section::JobOpeningsManage
            | Section::DocumentsManage => &[Admin, Hr],
            Section::LeadDashboard => &[Admin, Lead, LeadProject],
            Section::VolunteerDashboard => &[Admin, Volunteer],
            Section::Onboarding => &[Admin, Unassigned],
            Section::Candidates | Section::Evaluations | Section::CommunicationsSend => {
                &[Admin, Hr, Lead, LeadProject]
            }
            Section::Documents | Section::Communications => Role::ALL,
        }
    }
}

impl Role {
    pub fn can_access(self, section: Section) -> bool {
        section.allowed_roles().contains(&self)
    }

    /// The dashboard a freshly authenticated user of this role lands on.
    pub fn home_section(self) -> Section {
        match self {
            Role::Admin => Section::AdminDashboard,
            Role::Hr => Section::HrDashboard,
            Role::Lead | Role::LeadProject => Section::LeadDashboard,
            Role::Volunteer => Section::VolunteerDashboard,
            Role::Unassigned => Section::Onboarding,
        }
    }
}

/// authorize
///
/// The single capability check. A missing session and a session whose role is
/// outside the section's set are indistinguishable to the caller: both yield
/// `ApiError::Unauthorized`, which renders as a redirect to `/login`.
pub fn authorize(session: Option<&Session>, section: Section) -> Result<&Session, ApiError> {
    match session {
        Some(session) if session.role.can_access(section) => Ok(session),
        Some(session) => {
            tracing::debug!(
                user_id = %session.user_id,
                role = %session.role,
                section = %section,
                "role outside section"
            );
            Err(ApiError::Unauthorized)
        }
        None => Err(ApiError::Unauthorized),
    }
}

impl Session {
    /// Shorthand for `authorize(Some(self), section)`.
    pub fn require(&self, section: Section) -> Result<&Session, ApiError> {
        authorize(Some(self), section)
    }
}

/// GuardState
///
/// `Checking` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    Checking,
    Authorized(Session),
    Unauthorized,
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GuardState::Checking)
    }
}

/// SessionGuard
///
/// Gate for one section. It starts in `Checking`, makes exactly one transition
/// on the first `resolve`, and keeps that outcome: later session changes are not
/// re-validated by the same guard.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    section: Section,
    state: GuardState,
}

impl SessionGuard {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            state: GuardState::Checking,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn resolve(&mut self, session: Option<&Session>) -> &GuardState {
        if !self.state.is_terminal() {
            self.state = match authorize(session, self.section) {
                Ok(session) => GuardState::Authorized(session.clone()),
                Err(_) => GuardState::Unauthorized,
            };
        }
        &self.state
    }

    /// Consumes the guard, yielding the authorized session or the redirect error.
    pub fn into_result(self) -> Result<Session, ApiError> {
        match self.state {
            GuardState::Authorized(session) => Ok(session),
            GuardState::Checking | GuardState::Unauthorized => Err(ApiError::Unauthorized),
        }
    }
}

// --- Navigation ---

/// NavItem
///
/// One entry of the sidebar tree. Items are pruned per role: an entry survives
/// only when the role can access its section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub label: String,
    pub path: String,
    pub section: Section,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<NavItem>,
}

fn leaf(label: &str, path: &str, section: Section) -> NavItem {
    NavItem {
        label: label.to_string(),
        path: path.to_string(),
        section,
        children: Vec::new(),
    }
}

fn branch(label: &str, path: &str, section: Section, children: Vec<NavItem>) -> NavItem {
    NavItem {
        children,
        ..leaf(label, path, section)
    }
}

/// The full sidebar, before per-role pruning.
pub fn navigation_tree() -> Vec<NavItem> {
    vec![
        branch(
            "Admin",
            "/admin",
            Section::AdminDashboard,
            vec![
                leaf("Users", "/admin/users", Section::UserManagement),
                leaf("Statistics", "/admin/stats", Section::AdminDashboard),
            ],
        ),
        branch(
            "HR",
            "/hr",
            Section::HrDashboard,
            vec![
                leaf("Candidates", "/hr/candidates", Section::Candidates),
                leaf("Recruitment Board", "/hr/board", Section::CandidatePipeline),
                leaf("Job Openings", "/hr/jobs", Section::JobOpeningsManage),
                leaf("Document Library", "/hr/documents", Section::DocumentsManage),
            ],
        ),
        branch(
            "Project Lead",
            "/lead",
            Section::LeadDashboard,
            vec![
                leaf("Candidates", "/lead/candidates", Section::Candidates),
                leaf("Evaluations", "/lead/evaluations", Section::Evaluations),
            ],
        ),
        branch(
            "Volunteer",
            "/volunteer",
            Section::VolunteerDashboard,
            vec![leaf("Resources", "/volunteer/documents", Section::Documents)],
        ),
        branch(
            "Onboarding",
            "/onboarding",
            Section::Onboarding,
            vec![leaf("Getting Started", "/onboarding/documents", Section::Documents)],
        ),
        leaf("Documents", "/documents", Section::Documents),
        branch(
            "Communications",
            "/communications",
            Section::Communications,
            vec![leaf("Compose", "/communications/new", Section::CommunicationsSend)],
        ),
    ]
}

fn prune(items: Vec<NavItem>, role: Role) -> Vec<NavItem> {
    items
        .into_iter()
        .filter(|item| role.can_access(item.section))
        .map(|item| NavItem {
            children: prune(item.children, role),
            ..item
        })
        .collect()
}

pub fn navigation_for(role: Role) -> Vec<NavItem> {
    prune(navigation_tree(), role)
}

/// Dashboard
///
/// What `GET /dashboard` returns: where the role lands and what it may navigate to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Dashboard {
    pub role: Role,
    pub home: Section,
    pub navigation: Vec<NavItem>,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            home: role.home_section(),
            navigation: navigation_for(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GuardResponse {
    pub section: Section,
    pub state: String,
}
