use studybudd_core::models::{Document, NewDocument};
use studybudd_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Document metadata persistence.
///
/// Reads and deletes take the owner id alongside the document id so a row
/// belonging to someone else is indistinguishable from a missing row.
#[async_trait::async_trait]
pub trait DocumentRepositoryTrait: Send + Sync {
    /// Insert a row and return it with database-assigned timestamps.
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError>;

    /// All documents of one owner, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Document>, AppError>;

    async fn get_by_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>, AppError>;

    async fn delete(&self, document: &Document) -> Result<(), AppError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DocumentRepositoryTrait for DocumentRepository {
    #[tracing::instrument(
        skip(self, document),
        fields(
            db.table = "documents",
            db.operation = "insert",
            db.record_id = %document.id,
            user_id = %document.user_id
        )
    )]
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError> {
        let row = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO documents (
                id, user_id, filename, original_filename, file_type,
                mime_type, file_size, storage_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(document.id)
        .bind(document.user_id)
        .bind(&document.filename)
        .bind(&document.original_filename)
        .bind(&document.file_type)
        .bind(&document.mime_type)
        .bind(document.file_size)
        .bind(&document.storage_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<Postgres, Document>(
            "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    async fn get_by_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, Document>(
            "SELECT * FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "delete", db.record_id = %document.id))]
    async fn delete(&self, document: &Document) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(document.id)
            .bind(document.user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(document_id = %document.id, "Document row already gone");
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
