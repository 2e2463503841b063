//! StudyBudd Database Library
//!
//! Document metadata persistence on PostgreSQL via sqlx. Every query is scoped
//! by the owning user's id.

pub mod db;

pub use db::{DocumentRepository, DocumentRepositoryTrait};

#[cfg(any(test, feature = "test-helpers"))]
pub use db::mock::MockDocumentRepository;
