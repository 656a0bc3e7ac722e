//! Scan job persistence
//!
//! A scan job is a durable request to reconcile one course. Jobs are created
//! `Waiting`, flipped to `Processing` by the worker, and deleted once the pass
//! ends whatever its outcome. There is never more than one job per course.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Result, ScanError};

/// Type-safe scan job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanJobId(Uuid);

impl ScanJobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ScanError::InvalidJobId(e.to_string()))
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ScanJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scan job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Queued, not yet picked up
    Waiting,
    /// Being reconciled by the worker
    Processing,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Processing => "processing",
        }
    }
}

impl std::str::FromStr for ScanStatus {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "processing" => Ok(Self::Processing),
            _ => Err(ScanError::InvalidStatus(s.to_string())),
        }
    }
}

/// A pending or in-flight scan request for one course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: ScanJobId,
    pub course_id: String,
    pub status: ScanStatus,
    /// Unix timestamp when created
    pub created_at: i64,
    /// Unix timestamp when last updated
    pub updated_at: i64,
}

impl ScanJob {
    /// Create a waiting job for `course_id` stamped at `now`
    pub fn new(course_id: impl Into<String>, now: i64) -> Self {
        Self {
            id: ScanJobId::new(),
            course_id: course_id.into(),
            status: ScanStatus::Waiting,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for persisting scan jobs
#[async_trait]
pub trait ScanJobRepository: Send + Sync {
    /// Insert `job` unless its course already has a job.
    ///
    /// Returns `true` if the job was created.
    async fn create_if_absent(&self, job: &ScanJob) -> Result<bool>;

    /// Oldest waiting job by creation time
    async fn next_waiting(&self) -> Result<Option<ScanJob>>;

    /// Flip a job to `Processing`
    async fn mark_processing(&self, id: ScanJobId, now: i64) -> Result<()>;

    /// Delete a job; returns `false` if it was already gone
    async fn delete(&self, id: ScanJobId) -> Result<bool>;

    /// The job of a course, if any
    async fn find_by_course(&self, course_id: &str) -> Result<Option<ScanJob>>;

    /// Put every `Processing` job back to `Waiting`; returns how many were reset
    async fn reset_processing(&self, now: i64) -> Result<u64>;
}

/// SQLite implementation of the scan job repository
pub struct SqliteScanJobRepository {
    pool: SqlitePool,
}

impl SqliteScanJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database table if it doesn't exist
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scan_jobs (
                id TEXT PRIMARY KEY NOT NULL,
                course_id TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scan_jobs_status_created
            ON scan_jobs(status, created_at ASC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_job(row: &SqliteRow) -> Result<ScanJob> {
    Ok(ScanJob {
        id: ScanJobId::from_string(&row.get::<String, _>("id"))?,
        course_id: row.get("course_id"),
        status: row.get::<String, _>("status").parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl ScanJobRepository for SqliteScanJobRepository {
    async fn create_if_absent(&self, job: &ScanJob) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO scan_jobs (id, course_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(course_id) DO NOTHING
            "#,
        )
        .bind(job.id.as_str())
        .bind(&job.course_id)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn next_waiting(&self) -> Result<Option<ScanJob>> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, status, created_at, updated_at
            FROM scan_jobs
            WHERE status = 'waiting'
            ORDER BY created_at ASC, rowid ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_job).transpose()
    }

    async fn mark_processing(&self, id: ScanJobId, now: i64) -> Result<()> {
        sqlx::query("UPDATE scan_jobs SET status = 'processing', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: ScanJobId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM scan_jobs WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_course(&self, course_id: &str) -> Result<Option<ScanJob>> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, status, created_at, updated_at
            FROM scan_jobs
            WHERE course_id = ?
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_job).transpose()
    }

    async fn reset_processing(&self, now: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE scan_jobs SET status = 'waiting', updated_at = ? WHERE status = 'processing'",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
