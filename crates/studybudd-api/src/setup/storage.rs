//! Blob store setup

use anyhow::{Context, Result};
use std::sync::Arc;
use studybudd_core::Config;
use studybudd_storage::{create_blob_store, BlobStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    let blob_store = create_blob_store(&config.storage)
        .await
        .context("Failed to initialize blob store")?;

    tracing::info!(
        backend = %config.storage.backend,
        bucket = %config.storage.bucket,
        max_upload_mb = config.storage.max_upload_size_mb,
        "Blob store initialized"
    );

    Ok(blob_store)
}
