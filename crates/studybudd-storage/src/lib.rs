//! StudyBudd Storage Library
//!
//! Blob store client for uploaded documents. The `BlobStore` trait is the seam
//! the document workflow talks to; `ObjectBlobStore` implements it over
//! `object_store` for S3-compatible buckets (including Supabase Storage), the
//! local filesystem, and an in-memory store.
//!
//! # Storage path format
//!
//! Every blob lives at `{owner_id}/{uuid}.{ext}`, where `ext` is taken from the
//! uploaded file name. Path generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
pub mod object;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_blob_store, public_base_url};
pub use object::ObjectBlobStore;
pub use studybudd_core::StorageBackend;
pub use traits::{BlobStore, RemoveOutcome, StorageError, StorageResult};
