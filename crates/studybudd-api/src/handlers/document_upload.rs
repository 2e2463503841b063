use crate::auth::models::AuthenticatedUser;
use crate::constants::UPLOAD_FIELD_NAME;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::UploadRequest;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use studybudd_core::models::DocumentUploadResponse;
use studybudd_core::AppError;

#[utoipa::path(
    post,
    path = "/api/documents/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Multipart form with a `file` field (PDF, PNG or JPEG)"),
    responses(
        (status = 201, description = "Document uploaded successfully", body = DocumentUploadResponse),
        (status = 400, description = "Missing file, disallowed type, or file too large", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.user_id, operation = "upload_document"))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let read_error = |err| multipart_error(err, &headers, state.documents.max_upload_bytes());
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let filename = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let content = field.bytes().await.map_err(read_error)?;

        upload = Some(UploadRequest {
            owner: user.user_id,
            filename,
            content_type,
            content: content.to_vec(),
        });
        break;
    }

    let request =
        upload.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;
    let document = state.documents.upload(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentUploadResponse::new(document)),
    ))
}

/// A body cut off by the request size limit is an oversized file, not a
/// malformed form.
fn multipart_error(err: MultipartError, headers: &HeaderMap, max_bytes: usize) -> HttpAppError {
    if err.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return err.into();
    }
    let size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    AppError::FileTooLarge {
        size,
        max_mb: max_bytes / 1024 / 1024,
    }
    .into()
}
