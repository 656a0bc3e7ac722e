//! Core service façade and bootstrap helpers.
//!
//! This crate wires a [`CoreConfig`] into a running course library: it opens
//! the SQLite pool, builds the repositories, starts the single scan worker and
//! the periodic availability sweep, and exposes the operations the API layer
//! calls. Desktop hosts typically enable the `desktop-shims` feature (which
//! depends on `bridge-desktop`) so the filesystem adapter is injected
//! automatically.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/courses/library.db")
//!     .build()?;
//! let core = CoreService::bootstrap(config).await?;
//!
//! let course = core.add_course("Rust", "/media/courses/rust").await?;
//! // ... later
//! core.shutdown().await;
//! ```

pub mod error;

pub use error::{CoreError, Result};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::TokioFileSystem;

use std::sync::Arc;

use bridge_traits::Clock;

use core_library::repositories::{
    AssetRepository, AttachmentRepository, CourseRepository, SqliteAssetRepository,
    SqliteAttachmentRepository, SqliteCourseRepository,
};
use core_library::{create_pool, Asset, Attachment, Course, DatabaseConfig, SqlitePool};
use core_runtime::config::CoreConfig;
use core_scan::{
    AvailabilityUpdater, CourseScanner, ScanJob, ScanQueue, ScanStatus, ScannerDependencies,
    SqliteScanJobRepository, SweepStats,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Repositories shared by the façade and the background tasks.
#[derive(Clone)]
pub struct CoreRepositories {
    pub courses: Arc<dyn CourseRepository>,
    pub assets: Arc<dyn AssetRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
}

impl CoreRepositories {
    /// SQLite-backed repositories over one pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            courses: Arc::new(SqliteCourseRepository::new(pool.clone())),
            assets: Arc::new(SqliteAssetRepository::new(pool.clone())),
            attachments: Arc::new(SqliteAttachmentRepository::new(pool)),
        }
    }
}

struct Inner {
    repositories: CoreRepositories,
    clock: Arc<dyn Clock>,
    queue: ScanQueue,
    availability: Arc<AvailabilityUpdater>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<Inner>,
}

impl CoreService {
    /// Open the database at `config.database_path` and start the engine.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;
        Self::with_pool(config, pool).await
    }

    /// Start the engine on an existing pool (migrations already applied).
    pub async fn with_pool(config: CoreConfig, pool: SqlitePool) -> Result<Self> {
        let jobs = Arc::new(SqliteScanJobRepository::new(pool.clone()));
        jobs.initialize().await?;

        let repositories = CoreRepositories::sqlite(pool);

        let scanner = Arc::new(CourseScanner::new(
            ScannerDependencies {
                courses: repositories.courses.clone(),
                assets: repositories.assets.clone(),
                attachments: repositories.attachments.clone(),
                file_system: config.file_system.clone(),
                clock: config.clock.clone(),
            },
            config.scan.clone(),
        ));

        let availability = Arc::new(AvailabilityUpdater::new(
            repositories.courses.clone(),
            config.file_system.clone(),
            config.clock.clone(),
        ));

        let (queue, worker) =
            ScanQueue::new(jobs, repositories.courses.clone(), config.clock.clone());
        let shutdown = CancellationToken::new();
        let mut tasks = Vec::new();

        let worker_shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = worker.run(scanner, worker_shutdown).await {
                error!("Scan worker exited with error: {}", e);
            }
        }));

        if let Some(interval) = config.scan.availability_sweep_interval {
            let sweeper = availability.clone();
            let sweep_shutdown = shutdown.clone();
            tasks.push(tokio::spawn(async move {
                sweeper.run_periodic(interval, sweep_shutdown).await;
            }));
        }

        info!(
            database = %config.database_path.display(),
            max_depth = config.scan.max_depth,
            "Course library core started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                repositories,
                clock: config.clock.clone(),
                queue,
                availability,
                shutdown,
                tasks: Mutex::new(tasks),
            }),
        })
    }

    /// Access the repositories backing the service.
    pub fn repositories(&self) -> &CoreRepositories {
        &self.inner.repositories
    }

    /// Register a course rooted at `path` and queue its first scan.
    pub async fn add_course(
        &self,
        title: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Course> {
        let now = self.inner.clock.unix_timestamp();
        let course = Course::new(title.into(), path.into(), now);
        self.inner.repositories.courses.insert(&course).await?;
        self.inner.queue.add(&course.id).await?;
        Ok(course)
    }

    /// Queue a rescan; `None` if one is already waiting or running.
    pub async fn enqueue_scan(&self, course_id: &str) -> Result<Option<ScanJob>> {
        Ok(self.inner.queue.add(course_id).await?)
    }

    /// Waiting/Processing while a scan is queued, `None` otherwise.
    pub async fn scan_status(&self, course_id: &str) -> Result<Option<ScanStatus>> {
        Ok(self.inner.queue.status(course_id).await?)
    }

    pub async fn course(&self, course_id: &str) -> Result<Option<Course>> {
        Ok(self.inner.repositories.courses.find_by_id(course_id).await?)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.inner.repositories.courses.list().await?)
    }

    /// Remove a course; everything recorded for it is deleted by cascade.
    pub async fn delete_course(&self, course_id: &str) -> Result<bool> {
        Ok(self.inner.repositories.courses.delete(course_id).await?)
    }

    pub async fn course_assets(&self, course_id: &str) -> Result<Vec<Asset>> {
        Ok(self
            .inner
            .repositories
            .assets
            .list_for_course(course_id)
            .await?)
    }

    pub async fn asset_attachments(&self, asset_id: &str) -> Result<Vec<Attachment>> {
        Ok(self
            .inner
            .repositories
            .attachments
            .list_for_asset(asset_id)
            .await?)
    }

    /// Run one availability sweep now instead of waiting for the next tick.
    pub async fn refresh_availability(&self) -> Result<SweepStats> {
        Ok(self.inner.availability.sweep().await?)
    }

    /// Stop the worker and the sweep, waiting for an in-flight scan to finish.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();

        let tasks: Vec<_> = self.inner.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Background task failed to stop cleanly: {}", e);
            }
        }

        info!("Course library core stopped");
    }
}
