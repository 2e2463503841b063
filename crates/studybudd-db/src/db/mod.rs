//! Database repositories
//
// Document metadata repository and its trait
pub mod documents;
//
// In-memory implementation for tests
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use documents::{DocumentRepository, DocumentRepositoryTrait};
