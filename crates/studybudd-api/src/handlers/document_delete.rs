use crate::auth::models::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::document_get::document_not_found;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, user),
    fields(user_id = %user.user_id, document_id = %id, operation = "delete_document")
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    let document = state
        .documents
        .get(id, user.user_id)
        .await?
        .ok_or_else(document_not_found)?;

    state.documents.delete(&document).await?;

    Ok(StatusCode::NO_CONTENT)
}
