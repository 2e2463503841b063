use crate::auth::models::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use studybudd_core::models::{DocumentListResponse, DocumentResponse, DocumentUrlResponse};
use studybudd_core::AppError;
use uuid::Uuid;

pub(crate) fn document_not_found() -> AppError {
    AppError::NotFound("Document not found".to_string())
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    responses(
        (status = 200, description = "Documents owned by the caller, newest first", body = DocumentListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state.documents.list(user.user_id).await?;
    Ok(Json(DocumentListResponse::from(documents)))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get(id, user.user_id)
        .await?
        .ok_or_else(document_not_found)?;

    Ok(Json(DocumentResponse::from(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/url",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Public URL of the stored file", body = DocumentUrlResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document_url(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let url = state
        .documents
        .public_url(id, user.user_id)
        .await?
        .ok_or_else(document_not_found)?;

    Ok(Json(DocumentUrlResponse { id, url }))
}
