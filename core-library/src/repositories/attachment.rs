//! Attachment repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Attachment;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Attachment repository interface for data access operations
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// List every attachment of a course ordered by path
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<Attachment>>;

    /// List the attachments owned by one asset ordered by path
    async fn list_for_asset(&self, asset_id: &str) -> Result<Vec<Attachment>>;

    /// Insert a new attachment
    ///
    /// # Errors
    /// Returns error if validation fails, the owning asset does not exist or
    /// the path is already taken
    async fn insert(&self, attachment: &Attachment) -> Result<()>;

    /// Delete an attachment by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the attachment was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLite implementation of AttachmentRepository
pub struct SqliteAttachmentRepository {
    pool: SqlitePool,
}

impl SqliteAttachmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_attachment(row: &SqliteRow) -> Result<Attachment> {
    Ok(Attachment {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        asset_id: row.try_get("asset_id")?,
        title: row.try_get("title")?,
        path: row.try_get("path")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AttachmentRepository for SqliteAttachmentRepository {
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<Attachment>> {
        let rows = sqlx::query("SELECT * FROM attachments WHERE course_id = ? ORDER BY path ASC")
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_attachment).collect()
    }

    async fn list_for_asset(&self, asset_id: &str) -> Result<Vec<Attachment>> {
        let rows = sqlx::query("SELECT * FROM attachments WHERE asset_id = ? ORDER BY path ASC")
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_attachment).collect()
    }

    async fn insert(&self, attachment: &Attachment) -> Result<()> {
        attachment
            .validate()
            .map_err(|msg| LibraryError::InvalidInput {
                field: "Attachment".to_string(),
                message: msg,
            })?;

        sqlx::query(
            r#"
            INSERT INTO attachments (id, course_id, asset_id, title, path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attachment.id)
        .bind(&attachment.course_id)
        .bind(&attachment.asset_id)
        .bind(&attachment.title)
        .bind(&attachment.path)
        .bind(attachment.created_at)
        .bind(attachment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
