use crate::{BlobStore, ObjectBlobStore, StorageBackend, StorageError, StorageResult};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use std::sync::Arc;
use studybudd_core::StorageConfig;

/// Base URL that public object URLs are built from.
///
/// - Supabase Storage: `{SUPABASE_URL}/storage/v1/object/public/{bucket}`
/// - custom S3-compatible endpoint: `{endpoint}/{bucket}` (path style)
/// - AWS: `https://{bucket}.s3.{region}.amazonaws.com`
/// - local: `LOCAL_STORAGE_BASE_URL`
pub fn public_base_url(config: &StorageConfig) -> String {
    match config.backend {
        StorageBackend::S3 => {
            if let Some(ref supabase_url) = config.supabase_url {
                format!(
                    "{}/storage/v1/object/public/{}",
                    supabase_url.trim_end_matches('/'),
                    config.bucket
                )
            } else if let Some(ref endpoint) = config.endpoint {
                format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket)
            } else {
                format!(
                    "https://{}.s3.{}.amazonaws.com",
                    config.bucket, config.region
                )
            }
        }
        StorageBackend::Local | StorageBackend::Memory => config
            .local_storage_base_url
            .clone()
            .unwrap_or_else(|| format!("memory://{}", config.bucket)),
    }
}

/// Create the blob store selected by configuration
pub async fn create_blob_store(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    let base_url = public_base_url(config);
    let max_bytes = config.max_upload_bytes();

    match config.backend {
        StorageBackend::S3 => {
            let mut builder = AmazonS3Builder::new()
                .with_bucket_name(config.bucket.clone())
                .with_region(config.region.clone());

            if let Some(ref endpoint) = config.endpoint {
                let allow_http = endpoint.starts_with("http://");
                builder = builder
                    .with_endpoint(endpoint.clone())
                    .with_allow_http(allow_http)
                    .with_virtual_hosted_style_request(false);
            }
            if let Some(ref key_id) = config.access_key_id {
                builder = builder.with_access_key_id(key_id.clone());
            }
            if let Some(ref secret) = config.secret_access_key {
                builder = builder.with_secret_access_key(secret.clone());
            }

            let store = builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?;

            tracing::info!(
                bucket = %config.bucket,
                region = %config.region,
                endpoint = config.endpoint.as_deref().unwrap_or("aws"),
                "S3 blob store configured"
            );

            Ok(Arc::new(ObjectBlobStore::new(
                Arc::new(store),
                config.bucket.clone(),
                base_url,
                max_bytes,
            )))
        }

        StorageBackend::Local => {
            let root = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            if config.local_storage_base_url.is_none() {
                return Err(StorageError::ConfigError(
                    "LOCAL_STORAGE_BASE_URL not configured".to_string(),
                ));
            }

            tokio::fs::create_dir_all(&root).await?;
            let store = LocalFileSystem::new_with_prefix(&root)
                .map_err(|e| StorageError::ConfigError(e.to_string()))?;

            tracing::info!(root = %root, "Local blob store configured");

            Ok(Arc::new(
                ObjectBlobStore::new(Arc::new(store), root, base_url, max_bytes)
                    .without_content_type_attributes(),
            ))
        }

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory blob store; uploads are lost on restart");
            Ok(Arc::new(ObjectBlobStore::new(
                Arc::new(InMemory::new()),
                "memory",
                base_url,
                max_bytes,
            )))
        }
    }
}
