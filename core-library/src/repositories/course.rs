//! Course repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Course;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Course repository interface for data access operations
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Find a course by its ID
    ///
    /// # Returns
    /// - `Ok(Some(course))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>>;

    /// Insert a new course
    ///
    /// # Errors
    /// Returns error if validation fails or another course already uses the path
    async fn insert(&self, course: &Course) -> Result<()>;

    /// Persist `card_path`, `available` and `updated_at`
    ///
    /// # Errors
    /// Returns [`LibraryError::NotFound`] if the course no longer exists
    async fn update(&self, course: &Course) -> Result<()>;

    /// Delete a course (cascades to its assets and attachments)
    ///
    /// # Returns
    /// - `Ok(true)` if the course was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List every course ordered by title
    async fn list(&self) -> Result<Vec<Course>>;
}

/// SQLite implementation of CourseRepository
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn validate_course(course: &Course) -> Result<()> {
        course.validate().map_err(|msg| LibraryError::InvalidInput {
            field: "Course".to_string(),
            message: msg,
        })
    }
}

fn row_to_course(row: &SqliteRow) -> Result<Course> {
    Ok(Course {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        path: row.try_get("path")?,
        card_path: row.try_get("card_path")?,
        available: row.try_get("available")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>> {
        let row = sqlx::query("SELECT * FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_course).transpose()
    }

    async fn insert(&self, course: &Course) -> Result<()> {
        Self::validate_course(course)?;
        sqlx::query(
            r#"
            INSERT INTO courses (id, title, path, card_path, available, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.path)
        .bind(&course.card_path)
        .bind(course.available)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<()> {
        Self::validate_course(course)?;
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET card_path = ?, available = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.card_path)
        .bind(course.available)
        .bind(course.updated_at)
        .bind(&course.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::NotFound {
                entity_type: "Course".to_string(),
                id: course.id.clone(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query("SELECT * FROM courses ORDER BY title ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_course).collect()
    }
}
