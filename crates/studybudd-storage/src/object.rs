use crate::keys;
use crate::traits::{BlobStore, RemoveOutcome, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// `BlobStore` over any `object_store` backend.
#[derive(Clone)]
pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    /// Label used in logs (bucket name or local root)
    location: String,
    public_base_url: String,
    max_upload_bytes: usize,
    /// The local filesystem backend rejects object attributes
    content_type_attributes: bool,
}

impl ObjectBlobStore {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        location: impl Into<String>,
        public_base_url: impl Into<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            location: location.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_upload_bytes,
            content_type_attributes: true,
        }
    }

    /// Skip the content-type attribute on writes.
    pub fn without_content_type_attributes(mut self) -> Self {
        self.content_type_attributes = false;
        self
    }

    fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / 1024 / 1024
    }

    fn put_options(&self, content_type: &str) -> PutOptions {
        if !self.content_type_attributes {
            return PutOptions::default();
        }
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        PutOptions {
            attributes,
            ..Default::default()
        }
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn store(
        &self,
        content: Vec<u8>,
        owner: Uuid,
        original_name: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = content.len();
        if size > self.max_upload_bytes {
            tracing::debug!(
                size_bytes = size,
                max_bytes = self.max_upload_bytes,
                "Rejected upload over size limit"
            );
            return Err(StorageError::TooLarge {
                size,
                max_mb: self.max_upload_mb(),
            });
        }

        let storage_path = keys::generate_storage_path(owner, original_name);
        let location = Path::from(storage_path.as_str());
        let start = Instant::now();

        self.store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(content)),
                self.put_options(content_type),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    location = %self.location,
                    key = %storage_path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            location = %self.location,
            key = %storage_path,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob upload successful"
        );

        Ok(storage_path)
    }

    async fn remove(&self, storage_path: &str) -> RemoveOutcome {
        if !keys::validate_storage_path(storage_path) {
            tracing::warn!(key = %storage_path, "Refusing to delete invalid storage path");
            return RemoveOutcome::FailedIgnored(format!(
                "Invalid storage path: {}",
                storage_path
            ));
        }

        let start = Instant::now();
        match self.store.delete(&Path::from(storage_path)).await {
            Ok(()) => {
                tracing::info!(
                    location = %self.location,
                    key = %storage_path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob delete successful"
                );
                RemoveOutcome::Removed
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    location = %self.location,
                    key = %storage_path,
                    "Blob delete failed, continuing"
                );
                RemoveOutcome::FailedIgnored(e.to_string())
            }
        }
    }

    fn public_url(&self, storage_path: &str) -> String {
        format!("{}/{}", self.public_base_url, storage_path)
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}
