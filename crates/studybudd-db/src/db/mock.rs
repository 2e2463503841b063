//! In-memory document repository for tests without a database.

use super::documents::DocumentRepositoryTrait;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use studybudd_core::models::{Document, NewDocument};
use studybudd_core::AppError;
use uuid::Uuid;

/// Same ownership semantics as `DocumentRepository`, rows kept in insertion order.
#[derive(Clone, Default)]
pub struct MockDocumentRepository {
    rows: Arc<Mutex<Vec<Document>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl MockDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `insert` fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of rows across all owners.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<Document>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentRepositoryTrait for MockDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows();
        if rows
            .iter()
            .any(|d| d.id == document.id || d.storage_path == document.storage_path)
        {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint".to_string(),
            )));
        }

        // Strictly increasing timestamps keep newest-first ordering deterministic
        let mut now = Utc::now();
        if let Some(last) = rows.last() {
            if now <= last.created_at {
                now = last.created_at + Duration::microseconds(1);
            }
        }

        let row = Document {
            id: document.id,
            user_id: document.user_id,
            filename: document.filename,
            original_filename: document.original_filename,
            file_type: document.file_type,
            mime_type: document.mime_type,
            file_size: document.file_size,
            storage_path: document.storage_path,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Document>, AppError> {
        let mut owned: Vec<Document> = self
            .rows()
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get_by_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self
            .rows()
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, document: &Document) -> Result<(), AppError> {
        self.rows()
            .retain(|d| !(d.id == document.id && d.user_id == document.user_id));
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybudd_core::models::DocumentKind;

    fn new_doc(user_id: Uuid, name: &str) -> NewDocument {
        NewDocument::new(
            user_id,
            DocumentKind::Pdf,
            name,
            format!("{}/{}.pdf", user_id, Uuid::new_v4()),
            1024,
        )
    }

    #[tokio::test]
    async fn test_insert_then_get_preserves_fields() {
        let repo = MockDocumentRepository::new();
        let user = Uuid::new_v4();
        let new = new_doc(user, "notes.pdf");

        let inserted = repo.insert(new.clone()).await.unwrap();
        let fetched = repo.get_by_owner(inserted.id, user).await.unwrap().unwrap();

        assert_eq!(fetched.id, new.id);
        assert_eq!(fetched.user_id, new.user_id);
        assert_eq!(fetched.filename, new.filename);
        assert_eq!(fetched.original_filename, new.original_filename);
        assert_eq!(fetched.file_type, new.file_type);
        assert_eq!(fetched.mime_type, new.mime_type);
        assert_eq!(fetched.file_size, new.file_size);
        assert_eq!(fetched.storage_path, new.storage_path);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let repo = MockDocumentRepository::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let doc = repo.insert(new_doc(alice, "a.pdf")).await.unwrap();
        repo.insert(new_doc(bob, "b.pdf")).await.unwrap();

        let listed = repo.list_by_owner(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|d| d.user_id == alice));

        for _ in 0..2 {
            assert!(repo.get_by_owner(doc.id, bob).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = MockDocumentRepository::new();
        let user = Uuid::new_v4();
        let first = repo.insert(new_doc(user, "first.pdf")).await.unwrap();
        let second = repo.insert(new_doc(user, "second.pdf")).await.unwrap();

        let listed = repo.list_by_owner(user).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_delete_and_failure_injection() {
        let repo = MockDocumentRepository::new();
        let user = Uuid::new_v4();
        let doc = repo.insert(new_doc(user, "a.pdf")).await.unwrap();

        repo.delete(&doc).await.unwrap();
        assert!(repo.get_by_owner(doc.id, user).await.unwrap().is_none());
        assert!(repo.is_empty());

        repo.fail_inserts(true);
        assert!(matches!(
            repo.insert(new_doc(user, "b.pdf")).await,
            Err(AppError::Database(_))
        ));
        assert!(repo.is_empty());
    }
}
