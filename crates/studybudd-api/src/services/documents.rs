//! Document workflow: upload, list, get, delete.
//!
//! Keeps handler logic thin and allows unit testing without HTTP. The blob is
//! written before the row; a failed insert leaves an orphaned blob, which is
//! logged with its path.

use std::sync::Arc;
use studybudd_core::models::{Document, DocumentKind, NewDocument};
use studybudd_core::AppError;
use studybudd_db::DocumentRepositoryTrait;
use studybudd_storage::{BlobStore, RemoveOutcome};
use uuid::Uuid;

const UNKNOWN_FILENAME: &str = "unknown";

/// Width of the `original_filename` column, in characters.
pub const MAX_FILENAME_CHARS: usize = 255;

/// One uploaded file, as received at the request boundary.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner: Uuid,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentService {
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn DocumentRepositoryTrait>,
}

impl DocumentService {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn DocumentRepositoryTrait>,
    ) -> Self {
        Self {
            blob_store,
            repository,
        }
    }

    pub fn repository(&self) -> &Arc<dyn DocumentRepositoryTrait> {
        &self.repository
    }

    /// Largest accepted upload, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.blob_store.max_upload_bytes()
    }

    #[tracing::instrument(skip(self, request), fields(user_id = %request.owner, size_bytes = request.content.len()))]
    pub async fn upload(&self, request: UploadRequest) -> Result<Document, AppError> {
        let kind = DocumentKind::from_mime(request.content_type.as_deref())?;

        let original_filename = request
            .filename
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
        if original_filename.chars().count() > MAX_FILENAME_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Filename too long. Maximum length is {} characters",
                MAX_FILENAME_CHARS
            )));
        }
        let file_size = request.content.len();

        let storage_path = self
            .blob_store
            .store(
                request.content,
                request.owner,
                &original_filename,
                kind.mime_type(),
            )
            .await?;

        let new_document = NewDocument::new(
            request.owner,
            kind,
            original_filename,
            storage_path.clone(),
            file_size as i64,
        );

        match self.repository.insert(new_document).await {
            Ok(document) => {
                tracing::info!(
                    document_id = %document.id,
                    storage_path = %document.storage_path,
                    mime_type = %document.mime_type,
                    "Document uploaded"
                );
                Ok(document)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_path = %storage_path,
                    "Failed to persist document metadata, blob left orphaned"
                );
                Err(e)
            }
        }
    }

    /// Documents owned by `owner`, newest first.
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Document>, AppError> {
        self.repository.list_by_owner(owner).await
    }

    pub async fn get(&self, id: Uuid, owner: Uuid) -> Result<Option<Document>, AppError> {
        self.repository.get_by_owner(id, owner).await
    }

    /// Remove the blob (best effort) and then the row.
    #[tracing::instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn delete(&self, document: &Document) -> Result<(), AppError> {
        match self.blob_store.remove(&document.storage_path).await {
            RemoveOutcome::Removed => {
                tracing::debug!(storage_path = %document.storage_path, "Blob removed");
            }
            RemoveOutcome::FailedIgnored(reason) => {
                tracing::warn!(
                    storage_path = %document.storage_path,
                    reason = %reason,
                    "Blob removal failed, deleting metadata anyway"
                );
            }
        }

        self.repository.delete(document).await
    }

    /// Public URL of an owned document's blob; `None` when the caller does not own it.
    pub async fn public_url(&self, id: Uuid, owner: Uuid) -> Result<Option<String>, AppError> {
        Ok(self
            .get(id, owner)
            .await?
            .map(|document| self.blob_store.public_url(&document.storage_path)))
    }
}
