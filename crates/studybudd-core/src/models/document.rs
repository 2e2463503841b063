use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppError;

/// Stored document metadata. One row per uploaded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Generated object name (`<uuid>.<ext>`), the last segment of `storage_path`
    pub filename: String,
    /// Name supplied by the uploader, for display only
    pub original_filename: String,
    pub file_type: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. `id` is assigned here; timestamps come from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
}

impl NewDocument {
    pub fn new(
        user_id: Uuid,
        kind: DocumentKind,
        original_filename: impl Into<String>,
        storage_path: impl Into<String>,
        file_size: i64,
    ) -> Self {
        let storage_path = storage_path.into();
        let filename = storage_path
            .rsplit('/')
            .next()
            .unwrap_or(storage_path.as_str())
            .to_string();

        Self {
            id: Uuid::new_v4(),
            user_id,
            filename,
            original_filename: original_filename.into(),
            file_type: kind.file_type().to_string(),
            mime_type: kind.mime_type().to_string(),
            file_size,
            storage_path,
        }
    }
}

/// Accepted upload MIME types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Png,
    Jpeg,
}

impl DocumentKind {
    pub const ALLOWED_LABEL: &'static str = "PDF, PNG, JPEG";

    /// Validate a declared content type against the allow-list.
    pub fn from_mime(content_type: Option<&str>) -> Result<Self, AppError> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .ok_or_else(|| AppError::InvalidInput("File content type is required".to_string()))?;

        match content_type {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "image/png" => Ok(DocumentKind::Png),
            "image/jpeg" => Ok(DocumentKind::Jpeg),
            other => Err(AppError::InvalidInput(format!(
                "File type {} not allowed. Allowed: {}",
                other,
                Self::ALLOWED_LABEL
            ))),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Png => "image/png",
            DocumentKind::Jpeg => "image/jpeg",
        }
    }

    /// Coarse category persisted in `file_type`.
    pub fn file_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Png | DocumentKind::Jpeg => "image",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            user_id: doc.user_id,
            filename: doc.filename,
            original_filename: doc.original_filename,
            file_type: doc.file_type,
            mime_type: doc.mime_type,
            file_size: doc.file_size,
            storage_path: doc.storage_path,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentUploadResponse {
    pub message: String,
    pub document: DocumentResponse,
}

impl DocumentUploadResponse {
    pub fn new(document: Document) -> Self {
        Self {
            message: "Document uploaded successfully".to_string(),
            document: document.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
    pub total: usize,
}

impl From<Vec<Document>> for DocumentListResponse {
    fn from(documents: Vec<Document>) -> Self {
        let documents: Vec<DocumentResponse> = documents.into_iter().map(Into::into).collect();
        DocumentListResponse {
            total: documents.len(),
            documents,
        }
    }
}

/// Public object URL for a stored document.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentUrlResponse {
    pub id: Uuid,
    pub url: String,
}
