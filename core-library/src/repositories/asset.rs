//! Asset repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Asset, AssetType};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Asset repository interface for data access operations
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// List every asset of a course, ordered by chapter then prefix
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<Asset>>;

    /// Insert a new asset
    ///
    /// # Errors
    /// Returns error if validation fails, the course does not exist or the
    /// path is already taken
    async fn insert(&self, asset: &Asset) -> Result<()>;

    /// Delete an asset by ID. Its attachments are removed by cascade.
    ///
    /// # Returns
    /// - `Ok(true)` if the asset was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLite implementation of AssetRepository
pub struct SqliteAssetRepository {
    pool: SqlitePool,
}

impl SqliteAssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_asset(row: &SqliteRow) -> Result<Asset> {
    let asset_type: String = row.try_get("type")?;
    Ok(Asset {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        prefix: row.try_get("prefix")?,
        chapter: row.try_get("chapter")?,
        asset_type: asset_type.parse::<AssetType>()?,
        path: row.try_get("path")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<Asset>> {
        let rows = sqlx::query(
            "SELECT * FROM assets WHERE course_id = ? ORDER BY chapter ASC, prefix ASC, path ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_asset).collect()
    }

    async fn insert(&self, asset: &Asset) -> Result<()> {
        asset.validate().map_err(|msg| LibraryError::InvalidInput {
            field: "Asset".to_string(),
            message: msg,
        })?;

        sqlx::query(
            r#"
            INSERT INTO assets (id, course_id, title, prefix, chapter, type, path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&asset.id)
        .bind(&asset.course_id)
        .bind(&asset.title)
        .bind(asset.prefix)
        .bind(&asset.chapter)
        .bind(asset.asset_type.as_str())
        .bind(&asset.path)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::Course;
    use crate::repositories::{CourseRepository, SqliteCourseRepository};

    async fn setup() -> (SqliteAssetRepository, Course) {
        let pool = create_test_pool().await.unwrap();
        let course = Course::new("Course".to_string(), "/c".to_string(), 1_700_000_000);
        SqliteCourseRepository::new(pool.clone())
            .insert(&course)
            .await
            .unwrap();
        (SqliteAssetRepository::new(pool), course)
    }

    fn asset(course: &Course, prefix: i64, chapter: &str, path: &str) -> Asset {
        Asset::new(
            course.id.clone(),
            "Lesson".to_string(),
            prefix,
            chapter.to_string(),
            AssetType::Video,
            path.to_string(),
            1_700_000_000,
        )
    }

    #[tokio::test]
    async fn test_insert_and_list_ordered() {
        let (repo, course) = setup().await;
        let b = asset(&course, 2, "01 Intro", "/c/01 Intro/02 b.mp4");
        let a = asset(&course, 1, "01 Intro", "/c/01 Intro/01 a.mp4");
        let root = asset(&course, 5, "", "/c/05 root.mp4");
        repo.insert(&b).await.unwrap();
        repo.insert(&a).await.unwrap();
        repo.insert(&root).await.unwrap();

        let listed = repo.list_for_course(&course.id).await.unwrap();
        let paths: Vec<_> = listed.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/c/05 root.mp4", "/c/01 Intro/01 a.mp4", "/c/01 Intro/02 b.mp4"]
        );
        assert_eq!(listed[1], a);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_course() {
        let (repo, _) = setup().await;
        let orphan = Asset::new(
            "no-such-course".to_string(),
            "Lesson".to_string(),
            1,
            String::new(),
            AssetType::Pdf,
            "/x/01 a.pdf".to_string(),
            1_700_000_000,
        );

        assert!(matches!(
            repo.insert(&orphan).await,
            Err(LibraryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, course) = setup().await;
        let a = asset(&course, 1, "", "/c/01 a.mp4");
        repo.insert(&a).await.unwrap();

        assert!(repo.delete(&a.id).await.unwrap());
        assert!(!repo.delete(&a.id).await.unwrap());
        assert!(repo.list_for_course(&course.id).await.unwrap().is_empty());
    }
}
