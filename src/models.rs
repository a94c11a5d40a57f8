use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// UnknownVariant
///
/// Returned when a stored or submitted string does not name a variant of one of the
/// closed enums below (roles, statuses, document types).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements the text mapping shared by every closed enum: `ALL`, `as_str`,
/// `Display` and `FromStr`. The text form matches the serde snake_case form.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

// --- Roles & Users ---

/// Role
///
/// The RBAC field. Decides which dashboard a user lands on and which sections
/// the session guard lets them into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    Hr,
    Lead,
    LeadProject,
    Volunteer,
    #[default]
    Unassigned,
}

text_enum!(Role {
    Admin => "admin",
    Hr => "hr",
    Lead => "lead",
    LeadProject => "lead_project",
    Volunteer => "volunteer",
    Unassigned => "unassigned",
});

/// User
///
/// The canonical identity record. The id mirrors the identity provider's user id,
/// so a verified token subject maps straight onto a row here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub team: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Documents ---

/// DocumentType
///
/// Category tag of a document. Each role is allowed a fixed subset of these
/// (see `filter::allowed_document_types`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DocumentType {
    Policy,
    Handbook,
    Training,
    Onboarding,
    Contract,
    ProjectPlan,
    Report,
    Evaluation,
}

text_enum!(DocumentType {
    Policy => "policy",
    Handbook => "handbook",
    Training => "training",
    Onboarding => "onboarding",
    Contract => "contract",
    ProjectPlan => "project_plan",
    Report => "report",
    Evaluation => "evaluation",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DocumentStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Archived,
}

text_enum!(DocumentStatus {
    Draft => "draft",
    PendingReview => "pending_review",
    Approved => "approved",
    Rejected => "rejected",
    Archived => "archived",
});

impl DocumentStatus {
    /// Approval workflow table. Every move is currently allowed; a status may
    /// also be re-applied to itself.
    pub fn transitions(self) -> &'static [DocumentStatus] {
        DocumentStatus::ALL
    }

    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        self.transitions().contains(&next)
    }
}

/// Document
///
/// A file record shown in the document libraries. `version` starts at 1, goes up on
/// every edit and is the token checked by optimistic updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub status: DocumentStatus,
    pub upload_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub version: i32,
    pub uploaded_by: Uuid,
    /// Object key of the uploaded file, if the upload flow has completed.
    pub storage_key: Option<String>,
}

// --- Candidates ---

/// ApplicationStatus
///
/// The recruitment pipeline stages, in board order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Screening,
    HrInterview,
    PmInterview,
    Evaluation,
    OfferSent,
    Accepted,
    Onboarded,
    Rejected,
    Withdrawn,
}

text_enum!(ApplicationStatus {
    Applied => "applied",
    Screening => "screening",
    HrInterview => "hr_interview",
    PmInterview => "pm_interview",
    Evaluation => "evaluation",
    OfferSent => "offer_sent",
    Accepted => "accepted",
    Onboarded => "onboarded",
    Rejected => "rejected",
    Withdrawn => "withdrawn",
});

impl ApplicationStatus {
    /// Targets reachable from this stage. Recruiters move cards freely on the
    /// board, so every stage lists every stage.
    pub fn transitions(self) -> &'static [ApplicationStatus] {
        ApplicationStatus::ALL
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.transitions().contains(&next)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CptOptStatus {
    #[default]
    NotApplicable,
    Cpt,
    Opt,
    StemOpt,
    Pending,
}

text_enum!(CptOptStatus {
    NotApplicable => "not_applicable",
    Cpt => "cpt",
    Opt => "opt",
    StemOpt => "stem_opt",
    Pending => "pending",
});

/// Candidate
///
/// An applicant moving through the recruitment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub applied_role: String,
    pub team: String,
    pub application_status: ApplicationStatus,
    pub cpt_opt_status: CptOptStatus,
    pub hr_interview_date: Option<DateTime<Utc>>,
    pub pm_interview_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

// --- Job Openings ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum JobStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

text_enum!(JobStatus {
    Draft => "draft",
    Open => "open",
    Closed => "closed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobOpening {
    pub id: Uuid,
    pub title: String,
    pub team: String,
    pub description: String,
    pub location: String,
    pub hours_per_week: i32,
    pub status: JobStatus,
    pub posted_at: DateTime<Utc>,
}

// --- Evaluations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Recommendation {
    StrongYes,
    Yes,
    No,
    StrongNo,
}

text_enum!(Recommendation {
    StrongYes => "strong_yes",
    Yes => "yes",
    No => "no",
    StrongNo => "strong_no",
});

/// Evaluation
///
/// An interviewer's scorecard for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Evaluation {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub evaluator_id: Uuid,
    pub score: i32,
    pub recommendation: Recommendation,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

// --- Communications ---

/// Communication
///
/// An announcement addressed to one or more roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Communication {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub subject: String,
    pub body: String,
    pub audience: Vec<Role>,
    pub sent_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// The password is only forwarded to the identity provider, never stored or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AssignRoleRequest {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateDocumentRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

/// UpdateDocumentRequest
///
/// Partial update for a document. `expected_version` must equal the stored version
/// or the update is rejected with 409.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateDocumentRequest {
    pub expected_version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

/// UploadUrlRequest
///
/// Input payload for requesting a short-lived upload URL (POST /documents/upload-url).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct UploadUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "volunteer_handbook.pdf")]
    pub filename: String,
    /// The MIME type the upload is constrained to.
    #[schema(example = "application/pdf")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct UploadUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key to reference from the document record once uploaded.
    pub resource_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCandidateRequest {
    pub name: String,
    pub email: String,
    pub applied_role: String,
    pub team: String,
    #[serde(default)]
    pub cpt_opt_status: CptOptStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCandidateRequest {
    pub expected_version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpt_opt_status: Option<CptOptStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr_interview_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm_interview_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CandidateStatusRequest {
    pub expected_version: i32,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateJobRequest {
    pub title: String,
    pub team: String,
    pub description: String,
    pub location: String,
    pub hours_per_week: i32,
    #[serde(default)]
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateEvaluationRequest {
    pub score: i32,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCommunicationRequest {
    pub subject: String,
    pub body: String,
    pub audience: Vec<Role>,
}

/// --- Dashboard Schemas (Output) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub unassigned_users: i64,
    pub total_candidates: i64,
    pub total_documents: i64,
    /// Documents waiting for an approval decision.
    pub pending_documents: i64,
    pub open_jobs: i64,
    pub candidates_by_status: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LocaleSettings {
    pub locales: Vec<String>,
    pub default_locale: String,
}

// --- Input Validation ---

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

/// Loose shape check: one '@' with a dotted domain after it.
pub fn is_valid_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn require_email(email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(format!("'{email}' is not a valid email address"))
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_HOURS_PER_WEEK: i32 = 60;

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_email(&self.email)?;
        require_text("full_name", &self.full_name)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }
}

impl CreateDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }
}

impl UpdateDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        Ok(())
    }
}

impl CreateCandidateRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_email(&self.email)?;
        require_text("applied_role", &self.applied_role)?;
        require_text("team", &self.team)
    }
}

impl UpdateCandidateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(role) = &self.applied_role {
            require_text("applied_role", role)?;
        }
        if let Some(team) = &self.team {
            require_text("team", team)?;
        }
        Ok(())
    }
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("team", &self.team)?;
        require_text("location", &self.location)?;
        if !(1..=MAX_HOURS_PER_WEEK).contains(&self.hours_per_week) {
            return Err(format!(
                "hours_per_week must be between 1 and {MAX_HOURS_PER_WEEK}"
            ));
        }
        Ok(())
    }
}

impl CreateEvaluationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.score) {
            return Err("score must be between 1 and 5".to_string());
        }
        Ok(())
    }
}

impl CreateCommunicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("subject", &self.subject)?;
        require_text("body", &self.body)?;
        if self.audience.is_empty() {
            return Err("audience must name at least one role".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_round_trips_through_serde_names() {
        for role in Role::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "Role");
        assert_eq!(err.value, "superuser");
    }

    #[test]
    fn pipeline_has_ten_stages_and_is_permissive() {
        assert_eq!(ApplicationStatus::ALL.len(), 10);
        for from in ApplicationStatus::ALL {
            for to in ApplicationStatus::ALL {
                assert!(from.can_transition_to(*to));
            }
        }
    }

    #[test]
    fn document_type_serializes_under_type_key() {
        let doc = Document {
            id: Uuid::nil(),
            name: "Handbook".to_string(),
            doc_type: DocumentType::Handbook,
            status: DocumentStatus::Approved,
            upload_date: Utc::now(),
            last_modified_date: Utc::now(),
            version: 1,
            uploaded_by: Uuid::nil(),
            storage_key: None,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""type":"handbook""#));
        assert!(!json.contains("doc_type"));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ana@livingstones.org"));
        assert!(!is_valid_email("ana.livingstones.org"));
        assert!(!is_valid_email("@livingstones.org"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana@x@y.org"));
    }

    #[test]
    fn evaluation_score_bounds() {
        let mut req = CreateEvaluationRequest {
            score: 5,
            recommendation: Recommendation::Yes,
            comments: String::new(),
        };
        assert!(req.validate().is_ok());
        req.score = 0;
        assert!(req.validate().is_err());
        req.score = 6;
        assert!(req.validate().is_err());
    }

    #[test]
    fn communication_requires_audience() {
        let req = CreateCommunicationRequest {
            subject: "Retreat".to_string(),
            body: "Saturday 9am".to_string(),
            audience: vec![],
        };
        assert!(req.validate().is_err());
    }
}
