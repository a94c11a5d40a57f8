use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    access::Section,
    auth::Session,
    error::ApiError,
    filter::{DocumentQuery, allowed_document_types, filter_documents},
    handlers::validated,
    models::{
        CreateDocumentRequest, Document, UpdateDocumentRequest, UploadUrlRequest,
        UploadUrlResponse,
    },
    storage::{extension_for, sanitize_key},
};

/// Loads a document the caller's role may see. Documents of a type outside the
/// role's set are reported as missing.
async fn visible_document(state: &AppState, session: &Session, id: Uuid) -> Result<Document, ApiError> {
    let document = state.repo.get_document(id).await?.ok_or(ApiError::NotFound)?;
    if allowed_document_types(session.role).contains(&document.doc_type) {
        Ok(document)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_documents
///
/// [Authenticated Route] Documents visible to the caller's role, narrowed by the
/// optional type, status and search filters. Newest upload first.
#[utoipa::path(
    get,
    path = "/documents",
    params(DocumentQuery),
    responses((status = 200, description = "Visible documents", body = [Document]))
)]
pub async fn list_documents(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    session.require(Section::Documents)?;
    let documents = state.repo.list_documents().await?;
    Ok(Json(filter_documents(
        &documents,
        allowed_document_types(session.role),
        &query,
    )))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Found", body = Document),
        (status = 404, description = "Missing or not visible to this role")
    )
)]
pub async fn get_document(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    session.require(Section::Documents)?;
    Ok(Json(visible_document(&state, &session, id).await?))
}

/// create_document
///
/// [Authenticated Route] Registers a document record. The uploader is the caller;
/// the record starts as a draft at version 1.
#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Created", body = Document),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_document(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    session.require(Section::DocumentsManage)?;
    validated(payload.validate())?;
    if !allowed_document_types(session.role).contains(&payload.doc_type) {
        return Err(ApiError::Validation(format!(
            "document type '{}' is not available to role '{}'",
            payload.doc_type, session.role
        )));
    }

    let document = state.repo.create_document(payload, session.user_id).await?;
    tracing::info!(document_id = %document.id, user_id = %session.user_id, "document created");
    Ok((StatusCode::CREATED, Json(document)))
}

/// update_document
///
/// [Authenticated Route] Partial update guarded by `expected_version`. A stale
/// version yields 409 and leaves the record untouched.
#[utoipa::path(
    put,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Updated", body = Document),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Version conflict")
    )
)]
pub async fn update_document(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>, ApiError> {
    session.require(Section::DocumentsManage)?;
    validated(payload.validate())?;

    let current = visible_document(&state, &session, id).await?;
    if let Some(next) = payload.status {
        if !current.status.can_transition_to(next) {
            return Err(ApiError::Validation(format!(
                "cannot move document from '{}' to '{next}'",
                current.status
            )));
        }
    }

    Ok(Json(state.repo.update_document(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_document(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    session.require(Section::DocumentsManage)?;
    if state.repo.delete_document(id).await? {
        tracing::info!(document_id = %id, user_id = %session.user_id, "document deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// get_upload_url
///
/// [Authenticated Route] Short-lived presigned PUT URL so the browser uploads the
/// file straight to storage. The object key is `documents/{uuid}.{ext}`, with the
/// extension taken from the accepted MIME type rather than the client filename.
#[utoipa::path(
    post,
    path = "/documents/upload-url",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "URL", body = UploadUrlResponse),
        (status = 400, description = "File type not accepted")
    )
)]
pub async fn get_upload_url(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    session.require(Section::DocumentsManage)?;
    if payload.filename.trim().is_empty() {
        return Err(ApiError::Validation("filename must not be empty".into()));
    }
    let extension = extension_for(&payload.file_type).ok_or_else(|| {
        ApiError::Validation(format!("file type '{}' is not accepted", payload.file_type))
    })?;

    let object_key = sanitize_key(&format!("documents/{}.{}", Uuid::new_v4(), extension));
    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
        .map_err(ApiError::Storage)?;

    Ok(Json(UploadUrlResponse {
        upload_url,
        resource_key: object_key,
    }))
}
